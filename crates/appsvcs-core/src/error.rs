//! Error types for the conversion engine.

use std::path::PathBuf;

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Errors that can occur while converting handler sources.
///
/// Malformed or unterminated handlers are not errors: they are dropped by
/// the extractor. Only I/O and serialization failures abort a run.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Failed to read a source, template or manifest file.
    #[error("Failed to read file {path}: {message}")]
    ReadError { path: PathBuf, message: String },

    /// Failed to write an artifact or manifest file.
    #[error("Failed to write file {path}: {message}")]
    WriteError { path: PathBuf, message: String },

    /// A required input directory does not exist.
    #[error("Directory not found: {0}")]
    MissingDirectory(PathBuf),

    /// Failed to serialize a manifest entry.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConvertError {
    pub(crate) fn read(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::ReadError {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::WriteError {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
