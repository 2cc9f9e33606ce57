//! Error types for the archive crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("manifest is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsafe entry path: {0:?}")]
    UnsafePath(String),

    #[error("duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("missing required entry: {0}")]
    MissingEntry(String),

    #[error("invalid archive: {0}")]
    Invalid(String),
}

/// Result type for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;
