//! Error types for sheet ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while listing or reading sheets.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Input path does not exist.
    #[error("input not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Input is neither a directory nor a known spreadsheet file.
    #[error("unsupported input format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// Workbook could not be opened or one of its sheets could not be decoded.
    #[error("failed to read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// Sheet id not known to the source.
    #[error("unknown sheet id {id}")]
    UnknownSheet { id: usize },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read or parse a CSV sheet.
    #[error("failed to parse CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },
}

impl IngestError {
    pub(crate) fn workbook(path: impl Into<PathBuf>, error: impl std::fmt::Display) -> Self {
        Self::Workbook {
            path: path.into(),
            message: error.to_string(),
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, error: &csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            message: error.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
