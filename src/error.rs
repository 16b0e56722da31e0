use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    #[error("no valid sample/ortholog pairs found ({lines} lines scanned)")]
    Validation { lines: usize },

    #[error("reference catalog {path} is unusable: {reason}")]
    Configuration { path: String, reason: String },

    #[error("required column `{field}` not found (available: {})", .available.join(", "))]
    MissingColumn { field: String, available: Vec<String> },

    #[error("column `{column}` resolves both `{first}` and `{second}`")]
    AmbiguousColumn {
        column: String,
        first: String,
        second: String,
    },

    #[error("{step} produced no rows ({before} rows before, {after} after)")]
    EmptyResult {
        step: String,
        before: usize,
        after: usize,
    },

    #[error("invalid ortholog id: {0}")]
    InvalidOrthologId(String),

    #[error("unknown reference source: {0}")]
    UnknownSource(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl EngineError {
    pub fn missing_column(field: &str, available: &[String]) -> Self {
        EngineError::MissingColumn {
            field: field.to_string(),
            available: available.to_vec(),
        }
    }
}
