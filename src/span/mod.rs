//! Source location tracking: file ids, byte spans, and human-readable rendering.
//!
//! Mirrors the shape of a `SourceManager`/`Span` pair: files are interned by path,
//! each file's newline offsets are precomputed once, and spans are cheap `Copy`
//! byte ranges that only make sense alongside the [`SourceMap`] that produced them.

use rustc_hash::FxHashMap;
use std::path::PathBuf;

/// Stable identifier for a file registered with a [`SourceMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub u32);

impl FileId {
    pub const INVALID: FileId = FileId(u32::MAX);

    pub fn is_invalid(self) -> bool {
        self == Self::INVALID
    }
}

/// A half-open byte range `[start, end)` within one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub file: FileId,
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(file: FileId, start: u32, end: u32) -> Self {
        Span { file, start, end }
    }

    /// A span that does not point anywhere, for synthetic nodes.
    pub const fn dummy() -> Self {
        Span {
            file: FileId::INVALID,
            start: 0,
            end: 0,
        }
    }

    pub fn is_valid(self) -> bool {
        !self.file.is_invalid()
    }

    pub fn len(self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Widens `self` to also cover `other`, provided both point at the same file.
    /// If one side is invalid, the other is returned unchanged.
    pub fn merge(self, other: Span) -> Span {
        if !self.is_valid() {
            return other;
        }
        if !other.is_valid() {
            return self;
        }
        if self.file != other.file {
            return other;
        }
        Span::new(self.file, self.start.min(other.start), self.end.max(other.end))
    }
}

/// 1-based line/column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SpanError {
    #[error("invalid file id {0:?}")]
    InvalidFileId(FileId),
}

struct FileRecord {
    path: PathBuf,
    contents: String,
    /// Byte offset of the start of each line; `line_offsets[0] == 0`.
    line_offsets: Vec<u32>,
}

fn build_line_offsets(contents: &str) -> Vec<u32> {
    let mut offsets = vec![0u32];
    for (i, byte) in contents.bytes().enumerate() {
        if byte == b'\n' {
            offsets.push(i as u32 + 1);
        }
    }
    offsets
}

/// Owns the source text of every file in a compilation and answers location queries.
#[derive(Default)]
pub struct SourceMap {
    files: Vec<FileRecord>,
    path_lookup: FxHashMap<PathBuf, FileId>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a file by path; calling this twice with the same path returns the
    /// same [`FileId`] without re-storing the contents.
    pub fn add_file(&mut self, path: impl Into<PathBuf>, contents: String) -> FileId {
        let path = path.into();
        if let Some(&id) = self.path_lookup.get(&path) {
            return id;
        }

        let line_offsets = build_line_offsets(&contents);
        let id = FileId(self.files.len() as u32);
        self.files.push(FileRecord {
            path: path.clone(),
            contents,
            line_offsets,
        });
        self.path_lookup.insert(path, id);
        id
    }

    fn lookup(&self, file: FileId) -> Result<&FileRecord, SpanError> {
        self.files
            .get(file.0 as usize)
            .ok_or(SpanError::InvalidFileId(file))
    }

    pub fn path(&self, file: FileId) -> Result<&PathBuf, SpanError> {
        Ok(&self.lookup(file)?.path)
    }

    pub fn source(&self, file: FileId) -> Result<&str, SpanError> {
        Ok(&self.lookup(file)?.contents)
    }

    /// Converts a byte offset to a 1-based line/column via binary search over the
    /// file's precomputed line-start table.
    pub fn to_line_col(&self, file: FileId, offset: u32) -> Result<LineCol, SpanError> {
        let record = self.lookup(file)?;
        let line_index = match record.line_offsets.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert_at) => insert_at.saturating_sub(1),
        };
        let line_start = record.line_offsets[line_index];
        Ok(LineCol {
            line: line_index + 1,
            column: (offset - line_start) as usize + 1,
        })
    }

    fn line_text(&self, record: &FileRecord, line: usize) -> &str {
        if line == 0 || line > record.line_offsets.len() {
            return "";
        }
        let start = record.line_offsets[line - 1] as usize;
        let end = record
            .line_offsets
            .get(line)
            .map(|&o| o as usize)
            .unwrap_or(record.contents.len());
        record.contents[start..end].trim_end_matches(['\n', '\r'])
    }

    /// Renders `path:line:col` followed by the offending source line and a
    /// caret underline whose length is `max(1, span.len())`.
    pub fn format_span(&self, span: Span) -> Result<String, SpanError> {
        if !span.is_valid() {
            return Ok("<unknown span>".to_string());
        }
        let record = self.lookup(span.file)?;
        let loc = self.to_line_col(span.file, span.start)?;
        let line_text = self.line_text(record, loc.line);

        let mut out = String::new();
        out.push_str(&format!(
            "{}:{}:{}",
            record.path.display(),
            loc.line,
            loc.column
        ));
        if !line_text.is_empty() {
            let gutter = loc.line.to_string();
            out.push_str(&format!("\n {} | {}", gutter, line_text));
            let caret_start = loc.column.saturating_sub(1);
            let caret_len = span.len().max(1) as usize;
            out.push_str(&format!(
                "\n {} | {}{}",
                " ".repeat(gutter.len()),
                " ".repeat(caret_start),
                "^".repeat(caret_len)
            ));
        }
        Ok(out)
    }
}
