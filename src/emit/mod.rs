//! Textual LLVM-IR emission.
//!
//! `Module`/`Function`/`BasicBlock` are builders, not a parsed IR: every
//! `emit_*` method appends an already-formatted line to the current block,
//! enforcing only the handful of invariants that make the output
//! byte-for-byte reproducible (terminator discipline, SSA-name freshness,
//! well-formed PHI/aggregate-index arity). Everything else — operand types,
//! callee validity — is the caller's responsibility; this layer does not
//! parse or type-check the strings it is handed.

use rustc_hash::FxHashMap;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EmitError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("phi with zero incoming values")]
    IllFormedPhi,
    #[error("extractvalue/insertvalue with zero indices")]
    IllFormedAggregateIndex,
    #[error("block already terminated")]
    BlockAlreadyTerminated,
    #[error("call_into used with a void return type")]
    VoidCallAssignment,
    #[error("destination SSA name must be non-empty and start with '%'")]
    InvalidSsaName,
    #[error("destination type could not be resolved")]
    UnresolvedType,
}

/// Prepends `%` if `label` doesn't already have it. Idempotent:
/// `format_label_operand(format_label_operand(l)?) == format_label_operand(l)`.
pub fn format_label_operand(label: &str) -> Result<String, EmitError> {
    if label.is_empty() {
        return Err(EmitError::EmptyName);
    }
    match label.strip_prefix('%') {
        Some(rest) if rest.is_empty() => Err(EmitError::EmptyName),
        Some(rest) => Ok(format!("%{rest}")),
        None => Ok(format!("%{label}")),
    }
}

fn sanitize_hint(hint: &str, fallback: &str) -> String {
    let cleaned: String = hint
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}

/// Issues the next name for `base` from a per-function monotonic counter:
/// bare on first use, `base.1`, `base.2`, … afterward.
fn issue(counters: &mut FxHashMap<String, u32>, base: String) -> String {
    let counter = counters.entry(base.clone()).or_insert(0);
    let name = if *counter == 0 {
        base
    } else {
        format!("{base}.{counter}")
    };
    *counter += 1;
    name
}

fn validate_ssa_name(name: &str) -> Result<(), EmitError> {
    if name.len() < 2 || !name.starts_with('%') {
        Err(EmitError::InvalidSsaName)
    } else {
        Ok(())
    }
}

fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\5C"),
            b'"' => out.push_str("\\22"),
            b'\n' => out.push_str("\\0A"),
            b'\r' => out.push_str("\\0D"),
            b'\t' => out.push_str("\\09"),
            0x20..=0x7E => out.push(b as char),
            _ => out.push_str(&format!("\\{b:02X}")),
        }
    }
    out
}

struct RenderedLine {
    text: String,
    /// Raw lines (`emit_raw`) are inserted verbatim; everything else gets
    /// the two-space in-block indent.
    indent: bool,
}

pub struct BasicBlock {
    label: String,
    is_entry: bool,
    lines: Vec<RenderedLine>,
    terminated: bool,
}

impl BasicBlock {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_entry(&self) -> bool {
        self.is_entry
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
}

/// One function's worth of builder state: its blocks, and the two monotonic
/// counters (SSA names, block labels) that give every name issued from the
/// same hint a stable, predictable suffix.
pub struct Function {
    name: String,
    return_type: String,
    params: Vec<(String, String)>,
    blocks: Vec<BasicBlock>,
    current: usize,
    ssa_counters: FxHashMap<String, u32>,
    label_counters: FxHashMap<String, u32>,
}

impl Function {
    fn new(name: String, return_type: String, params: Vec<(String, String)>) -> Self {
        Self {
            name,
            return_type,
            params,
            blocks: vec![BasicBlock {
                label: "entry".to_string(),
                is_entry: true,
                lines: Vec::new(),
                terminated: false,
            }],
            current: 0,
            ssa_counters: FxHashMap::default(),
            label_counters: FxHashMap::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    /// Creates a new block (not yet the insertion point) and returns its
    /// label, sanitized and de-duplicated against every label issued so far.
    pub fn create_block(&mut self, hint: &str) -> String {
        let label = issue(&mut self.label_counters, sanitize_hint(hint, "block"));
        self.blocks.push(BasicBlock {
            label: label.clone(),
            is_entry: false,
            lines: Vec::new(),
            terminated: false,
        });
        label
    }

    /// Moves the insertion point to the block named `label`. No-op if no
    /// such block exists (a programmer error — the label came from
    /// `create_block` or is `"entry"`).
    pub fn switch_to_block(&mut self, label: &str) {
        if let Some(index) = self.blocks.iter().position(|b| b.label == label) {
            self.current = index;
        }
    }

    fn current_block(&mut self) -> &mut BasicBlock {
        &mut self.blocks[self.current]
    }

    fn fresh_name(&mut self, hint: &str) -> String {
        issue(&mut self.ssa_counters, sanitize_hint(hint, "tmp"))
    }

    fn push_line(&mut self, text: String) -> Result<(), EmitError> {
        let block = self.current_block();
        if block.terminated {
            return Err(EmitError::BlockAlreadyTerminated);
        }
        block.lines.push(RenderedLine { text, indent: true });
        Ok(())
    }

    fn push_terminator(&mut self, text: String) -> Result<(), EmitError> {
        let block = self.current_block();
        if block.terminated {
            return Err(EmitError::BlockAlreadyTerminated);
        }
        block.lines.push(RenderedLine { text, indent: true });
        block.terminated = true;
        Ok(())
    }

    pub fn emit_comment(&mut self, text: &str) -> Result<(), EmitError> {
        self.push_line(format!("; {text}"))
    }

    pub fn emit_raw(&mut self, text: &str) -> Result<(), EmitError> {
        let block = self.current_block();
        if block.terminated {
            return Err(EmitError::BlockAlreadyTerminated);
        }
        block.lines.push(RenderedLine {
            text: text.to_string(),
            indent: false,
        });
        Ok(())
    }

    pub fn emit_binary(
        &mut self,
        opcode: &str,
        ty: &str,
        lhs: &str,
        rhs: &str,
        hint: &str,
    ) -> Result<String, EmitError> {
        let name = self.fresh_name(hint);
        self.push_line(format!("%{name} = {opcode} {ty} {lhs}, {rhs}"))?;
        Ok(format!("%{name}"))
    }

    pub fn emit_binary_into(
        &mut self,
        dest: &str,
        opcode: &str,
        ty: &str,
        lhs: &str,
        rhs: &str,
    ) -> Result<(), EmitError> {
        validate_ssa_name(dest)?;
        self.push_line(format!("{dest} = {opcode} {ty} {lhs}, {rhs}"))
    }

    pub fn emit_icmp(
        &mut self,
        pred: &str,
        ty: &str,
        lhs: &str,
        rhs: &str,
        hint: &str,
    ) -> Result<String, EmitError> {
        let name = self.fresh_name(hint);
        self.push_line(format!("%{name} = icmp {pred} {ty} {lhs}, {rhs}"))?;
        Ok(format!("%{name}"))
    }

    pub fn emit_icmp_into(
        &mut self,
        dest: &str,
        pred: &str,
        ty: &str,
        lhs: &str,
        rhs: &str,
    ) -> Result<(), EmitError> {
        validate_ssa_name(dest)?;
        self.push_line(format!("{dest} = icmp {pred} {ty} {lhs}, {rhs}"))
    }

    /// `incomings` is `(value, label)` pairs; labels are run through
    /// [`format_label_operand`].
    pub fn emit_phi(
        &mut self,
        ty: &str,
        incomings: &[(String, String)],
        hint: &str,
    ) -> Result<String, EmitError> {
        if incomings.is_empty() {
            return Err(EmitError::IllFormedPhi);
        }
        let body = self.render_phi_incomings(incomings)?;
        let name = self.fresh_name(hint);
        self.push_line(format!("%{name} = phi {ty} {body}"))?;
        Ok(format!("%{name}"))
    }

    pub fn emit_phi_into(
        &mut self,
        dest: &str,
        ty: &str,
        incomings: &[(String, String)],
    ) -> Result<(), EmitError> {
        if incomings.is_empty() {
            return Err(EmitError::IllFormedPhi);
        }
        validate_ssa_name(dest)?;
        let body = self.render_phi_incomings(incomings)?;
        self.push_line(format!("{dest} = phi {ty} {body}"))
    }

    fn render_phi_incomings(&self, incomings: &[(String, String)]) -> Result<String, EmitError> {
        let mut parts = Vec::with_capacity(incomings.len());
        for (value, label) in incomings {
            let label = format_label_operand(label)?;
            parts.push(format!("[ {value}, {label} ]"));
        }
        Ok(parts.join(", "))
    }

    /// `args` is `(type, value)` pairs. A `"void"` return type emits a
    /// void-valued call and yields `Ok(None)`; any other return type
    /// allocates an SSA name and yields `Ok(Some(name))`.
    pub fn emit_call(
        &mut self,
        ret_type: &str,
        callee: &str,
        args: &[(String, String)],
        hint: &str,
    ) -> Result<Option<String>, EmitError> {
        let arg_text = render_args(args);
        if ret_type == "void" {
            self.push_line(format!("call void {callee}({arg_text})"))?;
            return Ok(None);
        }
        let name = self.fresh_name(hint);
        self.push_line(format!("%{name} = call {ret_type} {callee}({arg_text})"))?;
        Ok(Some(format!("%{name}")))
    }

    pub fn emit_call_into(
        &mut self,
        dest: &str,
        ret_type: &str,
        callee: &str,
        args: &[(String, String)],
    ) -> Result<(), EmitError> {
        if ret_type == "void" {
            return Err(EmitError::VoidCallAssignment);
        }
        validate_ssa_name(dest)?;
        let arg_text = render_args(args);
        self.push_line(format!("{dest} = call {ret_type} {callee}({arg_text})"))
    }

    pub fn emit_load(
        &mut self,
        val_type: &str,
        ptr_type: &str,
        ptr: &str,
        align: Option<u32>,
        hint: &str,
    ) -> Result<String, EmitError> {
        let name = self.fresh_name(hint);
        let align_part = render_align(align);
        self.push_line(format!(
            "%{name} = load {val_type}, {ptr_type} {ptr}{align_part}"
        ))?;
        Ok(format!("%{name}"))
    }

    pub fn emit_load_into(
        &mut self,
        dest: &str,
        val_type: &str,
        ptr_type: &str,
        ptr: &str,
        align: Option<u32>,
    ) -> Result<(), EmitError> {
        validate_ssa_name(dest)?;
        let align_part = render_align(align);
        self.push_line(format!("{dest} = load {val_type}, {ptr_type} {ptr}{align_part}"))
    }

    pub fn emit_store(
        &mut self,
        val_type: &str,
        val: &str,
        ptr_type: &str,
        ptr: &str,
        align: Option<u32>,
    ) -> Result<(), EmitError> {
        let align_part = render_align(align);
        self.push_line(format!("store {val_type} {val}, {ptr_type} {ptr}{align_part}"))
    }

    pub fn emit_alloca(
        &mut self,
        ty: &str,
        count: Option<(String, String)>,
        align: Option<u32>,
        hint: &str,
    ) -> Result<String, EmitError> {
        let name = self.fresh_name(hint);
        let count_part = count
            .map(|(t, c)| format!(", {t} {c}"))
            .unwrap_or_default();
        let align_part = render_align(align);
        self.push_line(format!("%{name} = alloca {ty}{count_part}{align_part}"))?;
        Ok(format!("%{name}"))
    }

    pub fn emit_alloca_into(
        &mut self,
        dest: &str,
        ty: &str,
        count: Option<(String, String)>,
        align: Option<u32>,
    ) -> Result<(), EmitError> {
        validate_ssa_name(dest)?;
        let count_part = count
            .map(|(t, c)| format!(", {t} {c}"))
            .unwrap_or_default();
        let align_part = render_align(align);
        self.push_line(format!("{dest} = alloca {ty}{count_part}{align_part}"))
    }

    pub fn emit_getelementptr(
        &mut self,
        inbounds: bool,
        elem_type: &str,
        ptr_type: &str,
        ptr: &str,
        indices: &[(String, String)],
        hint: &str,
    ) -> Result<String, EmitError> {
        let name = self.fresh_name(hint);
        let line = render_gep(inbounds, elem_type, ptr_type, ptr, indices);
        self.push_line(format!("%{name} = {line}"))?;
        Ok(format!("%{name}"))
    }

    pub fn emit_getelementptr_into(
        &mut self,
        dest: &str,
        inbounds: bool,
        elem_type: &str,
        ptr_type: &str,
        ptr: &str,
        indices: &[(String, String)],
    ) -> Result<(), EmitError> {
        validate_ssa_name(dest)?;
        let line = render_gep(inbounds, elem_type, ptr_type, ptr, indices);
        self.push_line(format!("{dest} = {line}"))
    }

    pub fn emit_cast(
        &mut self,
        opcode: &str,
        from_type: &str,
        val: &str,
        to_type: &str,
        hint: &str,
    ) -> Result<String, EmitError> {
        let name = self.fresh_name(hint);
        self.push_line(format!("%{name} = {opcode} {from_type} {val} to {to_type}"))?;
        Ok(format!("%{name}"))
    }

    pub fn emit_cast_into(
        &mut self,
        dest: &str,
        opcode: &str,
        from_type: &str,
        val: &str,
        to_type: &str,
    ) -> Result<(), EmitError> {
        validate_ssa_name(dest)?;
        self.push_line(format!("{dest} = {opcode} {from_type} {val} to {to_type}"))
    }

    pub fn emit_extractvalue(
        &mut self,
        ty: &str,
        val: &str,
        indices: &[u32],
        hint: &str,
    ) -> Result<String, EmitError> {
        if indices.is_empty() {
            return Err(EmitError::IllFormedAggregateIndex);
        }
        let name = self.fresh_name(hint);
        let idx_text = render_indices(indices);
        self.push_line(format!("%{name} = extractvalue {ty} {val}, {idx_text}"))?;
        Ok(format!("%{name}"))
    }

    pub fn emit_extractvalue_into(
        &mut self,
        dest: &str,
        ty: &str,
        val: &str,
        indices: &[u32],
    ) -> Result<(), EmitError> {
        if indices.is_empty() {
            return Err(EmitError::IllFormedAggregateIndex);
        }
        validate_ssa_name(dest)?;
        let idx_text = render_indices(indices);
        self.push_line(format!("{dest} = extractvalue {ty} {val}, {idx_text}"))
    }

    pub fn emit_insertvalue(
        &mut self,
        ty: &str,
        val: &str,
        elem_type: &str,
        elem_val: &str,
        indices: &[u32],
        hint: &str,
    ) -> Result<String, EmitError> {
        if indices.is_empty() {
            return Err(EmitError::IllFormedAggregateIndex);
        }
        let name = self.fresh_name(hint);
        let idx_text = render_indices(indices);
        self.push_line(format!(
            "%{name} = insertvalue {ty} {val}, {elem_type} {elem_val}, {idx_text}"
        ))?;
        Ok(format!("%{name}"))
    }

    pub fn emit_insertvalue_into(
        &mut self,
        dest: &str,
        ty: &str,
        val: &str,
        elem_type: &str,
        elem_val: &str,
        indices: &[u32],
    ) -> Result<(), EmitError> {
        if indices.is_empty() {
            return Err(EmitError::IllFormedAggregateIndex);
        }
        validate_ssa_name(dest)?;
        let idx_text = render_indices(indices);
        self.push_line(format!(
            "{dest} = insertvalue {ty} {val}, {elem_type} {elem_val}, {idx_text}"
        ))
    }

    pub fn emit_ret(&mut self, ty: &str, val: &str) -> Result<(), EmitError> {
        self.push_terminator(format!("ret {ty} {val}"))
    }

    pub fn emit_ret_void(&mut self) -> Result<(), EmitError> {
        self.push_terminator("ret void".to_string())
    }

    pub fn emit_br(&mut self, label: &str) -> Result<(), EmitError> {
        let label = format_label_operand(label)?;
        self.push_terminator(format!("br label {label}"))
    }

    pub fn emit_cond_br(
        &mut self,
        cond: &str,
        then_label: &str,
        else_label: &str,
    ) -> Result<(), EmitError> {
        let then_label = format_label_operand(then_label)?;
        let else_label = format_label_operand(else_label)?;
        self.push_terminator(format!(
            "br i1 {cond}, label {then_label}, label {else_label}"
        ))
    }

    pub fn emit_switch(
        &mut self,
        ty: &str,
        val: &str,
        default_label: &str,
        cases: &[(String, String)],
    ) -> Result<(), EmitError> {
        let default_label = format_label_operand(default_label)?;
        let mut text = format!("switch {ty} {val}, label {default_label} [\n");
        for (case_val, case_label) in cases {
            let case_label = format_label_operand(case_label)?;
            text.push_str(&format!("    {ty} {case_val}, label {case_label}\n"));
        }
        text.push(']');
        self.push_terminator(text)
    }

    pub fn emit_unreachable(&mut self) -> Result<(), EmitError> {
        self.push_terminator("unreachable".to_string())
    }

    /// Interns `bytes` into `module`'s string-literal table, emits a GEP
    /// into it, and bitcasts to `dest_type` if that isn't already `i8*`.
    pub fn emit_string_literal(
        &mut self,
        module: &mut Module,
        bytes: &[u8],
        is_cstyle: bool,
        dest_type: &str,
        hint: &str,
    ) -> Result<String, EmitError> {
        if dest_type.is_empty() {
            return Err(EmitError::UnresolvedType);
        }
        let global_name = module.intern_string(bytes, is_cstyle);
        let len = bytes.len() + usize::from(is_cstyle);
        let array_type = format!("[{len} x i8]");
        let gep_name = self.fresh_name(hint);
        self.push_line(format!(
            "%{gep_name} = getelementptr {array_type}, {array_type}* {global_name}, i32 0, i32 0"
        ))?;
        if dest_type == "i8*" {
            return Ok(format!("%{gep_name}"));
        }
        let cast_name = self.fresh_name(hint);
        self.push_line(format!(
            "%{cast_name} = bitcast i8* %{gep_name} to {dest_type}"
        ))?;
        Ok(format!("%{cast_name}"))
    }

    /// `define <ret> @name(<p0 type> <p0 name>, …) { ... }`. An open block
    /// at render time gets a synthesized `unreachable` terminator.
    pub fn render(&self) -> String {
        let params_text = self
            .params
            .iter()
            .map(|(ty, name)| format!("{ty} {name}"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut out = format!(
            "define {} {}({}) {{\n",
            self.return_type, self.name, params_text
        );
        for block in &self.blocks {
            out.push_str(&format!("{}:\n", block.label));
            for line in &block.lines {
                if line.indent {
                    out.push_str("  ");
                }
                out.push_str(&line.text);
                out.push('\n');
            }
            if !block.terminated {
                out.push_str("  unreachable\n");
            }
        }
        out.push('}');
        out
    }
}

fn render_args(args: &[(String, String)]) -> String {
    args.iter()
        .map(|(ty, val)| format!("{ty} {val}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_align(align: Option<u32>) -> String {
    align.map(|a| format!(", align {a}")).unwrap_or_default()
}

fn render_indices(indices: &[u32]) -> String {
    indices
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_gep(
    inbounds: bool,
    elem_type: &str,
    ptr_type: &str,
    ptr: &str,
    indices: &[(String, String)],
) -> String {
    let inbounds_part = if inbounds { "inbounds " } else { "" };
    let idx_part = indices
        .iter()
        .map(|(ty, val)| format!("{ty} {val}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("getelementptr {inbounds_part}{elem_type}, {ptr_type} {ptr}, {idx_part}")
}

/// A whole module being built: header metadata, type defs, globals
/// (including interned string-literal globals), and functions, all in
/// first-seen/insertion order.
pub struct Module {
    id: String,
    data_layout: Option<String>,
    target_triple: Option<String>,
    type_defs: Vec<(String, String)>,
    globals: Vec<String>,
    functions: Vec<Function>,
    string_literals: FxHashMap<(Vec<u8>, bool), String>,
}

impl Module {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data_layout: None,
            target_triple: None,
            type_defs: Vec::new(),
            globals: Vec::new(),
            functions: Vec::new(),
            string_literals: FxHashMap::default(),
        }
    }

    pub fn set_data_layout(&mut self, data_layout: impl Into<String>) {
        self.data_layout = Some(data_layout.into());
    }

    pub fn set_target_triple(&mut self, target_triple: impl Into<String>) {
        self.target_triple = Some(target_triple.into());
    }

    pub fn add_type_def(&mut self, name: &str, body: &str) -> Result<(), EmitError> {
        if name.is_empty() {
            return Err(EmitError::EmptyName);
        }
        self.type_defs.push((name.to_string(), body.to_string()));
        Ok(())
    }

    pub fn add_global(&mut self, line: impl Into<String>) {
        self.globals.push(line.into());
    }

    pub fn add_function(
        &mut self,
        name: &str,
        return_type: &str,
        params: Vec<(String, String)>,
    ) -> Result<&mut Function, EmitError> {
        if name.is_empty() {
            return Err(EmitError::EmptyName);
        }
        let full_name = if name.starts_with('@') {
            name.to_string()
        } else {
            format!("@{name}")
        };
        self.functions
            .push(Function::new(full_name, return_type.to_string(), params));
        Ok(self.functions.last_mut().expect("just pushed"))
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// Content-addressed: the same `(bytes, is_cstyle)` always returns the
    /// same global name. `is_cstyle` appends a trailing NUL and counts it in
    /// the array length.
    pub fn intern_string(&mut self, bytes: &[u8], is_cstyle: bool) -> String {
        let key = (bytes.to_vec(), is_cstyle);
        if let Some(name) = self.string_literals.get(&key) {
            return name.clone();
        }
        let name = format!("@str.{}", self.string_literals.len());
        let len = bytes.len() + usize::from(is_cstyle);
        let mut escaped = escape_bytes(bytes);
        if is_cstyle {
            escaped.push_str("\\00");
        }
        self.globals.push(format!(
            "{name} = private unnamed_addr constant [{len} x i8] c\"{escaped}\""
        ));
        self.string_literals.insert(key, name.clone());
        name
    }

    /// Module header, then (each separated by a blank line, only between
    /// non-empty groups) type defs, globals, functions.
    pub fn render(&self) -> String {
        let mut sections = Vec::new();

        let mut header_lines = vec![format!("; ModuleID = '{}'", self.id)];
        if let Some(dl) = &self.data_layout {
            header_lines.push(format!("target datalayout = \"{dl}\""));
        }
        if let Some(tt) = &self.target_triple {
            header_lines.push(format!("target triple = \"{tt}\""));
        }
        sections.push(header_lines.join("\n"));

        if !self.type_defs.is_empty() {
            let body = self
                .type_defs
                .iter()
                .map(|(name, body)| format!("%{name} = type {body}"))
                .collect::<Vec<_>>()
                .join("\n");
            sections.push(body);
        }

        if !self.globals.is_empty() {
            sections.push(self.globals.join("\n"));
        }

        for function in &self.functions {
            sections.push(function.render());
        }

        sections.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_function_renders_in_documented_order() {
        let mut module = Module::new("demo");
        module.set_data_layout("e-m:e-p270:32:32");
        module.set_target_triple("x86_64-unknown-linux-gnu");
        module.add_type_def("Pair", "{ i32, i32 }").unwrap();
        module.add_global("@counter = global i32 0");

        let function = module
            .add_function(
                "add",
                "i32",
                vec![
                    ("i32".to_string(), "%lhs".to_string()),
                    ("i32".to_string(), "%rhs".to_string()),
                ],
            )
            .unwrap();
        let sum = function.emit_binary("add", "i32", "%lhs", "%rhs", "sum").unwrap();
        function.emit_ret("i32", &sum).unwrap();

        let rendered = module.render();
        assert!(rendered.starts_with("; ModuleID = 'demo'\ntarget datalayout"));
        assert!(rendered.contains("%Pair = type { i32, i32 }"));
        assert!(rendered.contains("@counter = global i32 0"));
        assert!(rendered.contains("define i32 @add(i32 %lhs, i32 %rhs) {\n"));
        assert!(rendered.contains("entry:\n  %sum = add i32 %lhs, %rhs\n  ret i32 %sum\n"));
    }

    #[test]
    fn hint_collisions_get_monotonic_suffixes() {
        let mut module = Module::new("m");
        let function = module.add_function("f", "i32", vec![]).unwrap();
        let a = function.emit_binary("add", "i32", "0", "0", "x").unwrap();
        let b = function.emit_binary("add", "i32", "0", "0", "x").unwrap();
        let c = function.emit_binary("add", "i32", "0", "0", "x").unwrap();
        assert_eq!(a, "%x");
        assert_eq!(b, "%x.1");
        assert_eq!(c, "%x.2");
    }

    #[test]
    fn create_block_collisions_get_monotonic_suffixes() {
        let mut module = Module::new("m");
        let function = module.add_function("f", "void", vec![]).unwrap();
        let first = function.create_block("exit");
        let second = function.create_block("exit");
        assert_eq!(first, "exit");
        assert_eq!(second, "exit.1");
    }

    #[test]
    fn emitting_after_a_terminator_fails() {
        let mut module = Module::new("m");
        let function = module.add_function("f", "i32", vec![]).unwrap();
        function.emit_ret("i32", "0").unwrap();
        assert_eq!(
            function.emit_binary("add", "i32", "0", "0", "x"),
            Err(EmitError::BlockAlreadyTerminated)
        );
        assert_eq!(
            function.emit_comment("unreachable code"),
            Err(EmitError::BlockAlreadyTerminated)
        );
        assert_eq!(function.emit_br("somewhere"), Err(EmitError::BlockAlreadyTerminated));
    }

    #[test]
    fn unterminated_block_gets_synthesized_unreachable() {
        let mut module = Module::new("m");
        let function = module.add_function("f", "void", vec![]).unwrap();
        function.emit_comment("never returns").unwrap();
        assert!(function.render().contains("  unreachable\n"));
    }

    #[test]
    fn phi_with_zero_incomings_is_ill_formed() {
        let mut module = Module::new("m");
        let function = module.add_function("f", "i32", vec![]).unwrap();
        assert_eq!(
            function.emit_phi("i32", &[], "v"),
            Err(EmitError::IllFormedPhi)
        );
    }

    #[test]
    fn extractvalue_with_zero_indices_is_ill_formed() {
        let mut module = Module::new("m");
        let function = module.add_function("f", "i32", vec![]).unwrap();
        assert_eq!(
            function.emit_extractvalue("{ i32 }", "%agg", &[], "v"),
            Err(EmitError::IllFormedAggregateIndex)
        );
    }

    #[test]
    fn void_call_yields_no_name_other_return_types_do() {
        let mut module = Module::new("m");
        let function = module.add_function("f", "i32", vec![]).unwrap();
        let void_result = function.emit_call("void", "@log", &[], "ignored").unwrap();
        assert_eq!(void_result, None);
        let value_result = function.emit_call("i32", "@get", &[], "v").unwrap();
        assert_eq!(value_result, Some("%v".to_string()));
    }

    #[test]
    fn call_into_rejects_void_return_type() {
        let mut module = Module::new("m");
        let function = module.add_function("f", "i32", vec![]).unwrap();
        assert_eq!(
            function.emit_call_into("%dest", "void", "@log", &[]),
            Err(EmitError::VoidCallAssignment)
        );
    }

    #[test]
    fn into_variant_rejects_malformed_destination() {
        let mut module = Module::new("m");
        let function = module.add_function("f", "i32", vec![]).unwrap();
        assert_eq!(
            function.emit_binary_into("x", "add", "i32", "0", "0"),
            Err(EmitError::InvalidSsaName)
        );
        assert_eq!(
            function.emit_binary_into("%", "add", "i32", "0", "0"),
            Err(EmitError::InvalidSsaName)
        );
    }

    #[test]
    fn format_label_operand_is_idempotent() {
        assert_eq!(format_label_operand("L").unwrap(), "%L");
        assert_eq!(format_label_operand("%L").unwrap(), "%L");
        assert_eq!(
            format_label_operand(&format_label_operand("L").unwrap()).unwrap(),
            "%L"
        );
        assert_eq!(format_label_operand(""), Err(EmitError::EmptyName));
    }

    #[test]
    fn interning_same_bytes_twice_reuses_the_global() {
        let mut module = Module::new("m");
        let a = module.intern_string(b"hi", false);
        let b = module.intern_string(b"hi", false);
        let c = module.intern_string(b"bye", false);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, "@str.0");
        assert_eq!(c, "@str.1");
    }

    #[test]
    fn string_literal_escapes_control_bytes_as_uppercase_hex() {
        let mut module = Module::new("m");
        module.intern_string(&[0x01, b'"', b'\\', b'\n'], false);
        let rendered = module.render();
        assert!(rendered.contains("\\01\\22\\5C\\0A"));
    }

    #[test]
    fn emit_string_literal_bitcasts_when_dest_type_is_not_i8_ptr() {
        let mut module = Module::new("m");
        // emit_string_literal borrows module mutably via `function` already, so
        // intern into a second module standing in for the real target.
        let mut strings = Module::new("strings");
        let function = module.add_function("f", "i32*", vec![]).unwrap();
        let name = function
            .emit_string_literal(&mut strings, b"hi", false, "i32*", "s")
            .unwrap();
        assert!(name.starts_with("%s"));
        let rendered = function.render();
        assert!(rendered.contains("getelementptr [2 x i8], [2 x i8]* @str.0, i32 0, i32 0"));
        assert!(rendered.contains("bitcast i8* %s to i32*"));
    }

    #[test]
    fn emit_string_literal_skips_bitcast_for_i8_ptr_dest() {
        let mut module = Module::new("m");
        let mut strings = Module::new("strings");
        let function = module.add_function("f", "i8*", vec![]).unwrap();
        let name = function
            .emit_string_literal(&mut strings, b"hi", false, "i8*", "s")
            .unwrap();
        assert_eq!(name, "%s");
        assert!(!function.render().contains("bitcast"));
    }
}
