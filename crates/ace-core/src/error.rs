//! Fatal translation errors.

use ace_ingest::IngestError;
use thiserror::Error;

/// Errors that abort a translation run.
///
/// Recoverable conditions (orphan sheets, untyped sheets, duplicate keys)
/// are not errors; they are logged and collected in a
/// [`TranslationReport`](crate::report::TranslationReport).
#[derive(Debug, Error)]
pub enum TranslateError {
    /// A sheet could not be listed or read.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// The source lists no sheets at all.
    #[error("workbook has no data sheets")]
    EmptyWorkbook,
}

/// Result type for translation operations.
pub type Result<T> = std::result::Result<T, TranslateError>;
