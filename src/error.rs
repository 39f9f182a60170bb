//! Error types for the ts2cpp transpiler

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ts2cpp
#[derive(Debug, Error)]
pub enum TranspileError {
    #[error("Input file not found: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("Parse error at line {line}, column {column}: {message}")]
    ParseError {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Malformed ESTree input: {message}")]
    AstError { message: String },

    #[error("Unsupported construct at line {line}: {construct}")]
    UnsupportedConstruct { construct: String, line: usize },

    #[error("Invalid runtime include name '{name}': {reason}")]
    InvalidInclude { name: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TranspileError>;
