//! Compilation configuration: target metadata and the default emission
//! stage, loadable from a `#config.toml`-style file via `serde`/`toml`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmitStage {
    Ast,
    Hir,
    Mir,
    LlvmIr,
}

impl Default for EmitStage {
    fn default() -> Self {
        EmitStage::LlvmIr
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub target_triple: String,
    pub data_layout: String,
    pub emit_stage: EmitStage,
    pub output_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_triple: "x86_64-unknown-linux-gnu".to_string(),
            data_layout: "e-m:e-p270:32:32".to_string(),
            emit_stage: EmitStage::default(),
            output_path: None,
        }
    }
}

impl Config {
    /// Reads and parses a TOML config file; a missing file is not an error —
    /// callers that want one to exist should check beforehand.
    pub fn load(path: &Path) -> Result<Self, crate::errors::CompileError> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| crate::errors::CompileError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_the_documented_sample() {
        let config = Config::default();
        assert_eq!(config.target_triple, "x86_64-unknown-linux-gnu");
        assert_eq!(config.data_layout, "e-m:e-p270:32:32");
        assert_eq!(config.emit_stage, EmitStage::LlvmIr);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults_for_missing_fields() {
        let config: Config = toml::from_str("target-triple = \"wasm32-unknown-unknown\"").unwrap();
        assert_eq!(config.target_triple, "wasm32-unknown-unknown");
        assert_eq!(config.data_layout, Config::default().data_layout);
    }
}
