//! Error types shared across the library. The CLI boundary turns these into
//! user-facing messages; none of them are fatal to the process.

use thiserror::Error;

/// Failure writing to or reading from the key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backing store refused the write (full or unavailable).
    #[error("storage quota exceeded or unavailable")]
    QuotaExceeded,
}

/// Errors from collection operations.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// Input rejected; no state was changed.
    #[error("{0}")]
    Validation(String),

    /// The mutation was applied in memory but could not be persisted.
    #[error("Unable to save quotes: {0}")]
    Storage(#[from] StorageError),
}

impl QuoteError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Reasons an import file is rejected. State is never touched on rejection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("Invalid JSON file: {0}")]
    InvalidJson(String),

    #[error("Imported JSON must be an array of quote objects.")]
    NotAnArray,

    #[error("No valid quotes found in imported file.")]
    NoValidQuotes,
}

/// Sync failures. Local state is left untouched for every variant.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("a sync is already in progress")]
    Busy,

    #[error("remote source did not answer within {0:?}")]
    Timeout(std::time::Duration),

    #[error("remote request failed: {0}")]
    Remote(String),

    #[error("remote payload malformed: {0}")]
    Payload(String),

    #[error("remote source does not support {0}")]
    Unsupported(&'static str),

    #[error("merged quotes could not be saved: {0}")]
    Storage(#[from] StorageError),
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Payload(err.to_string())
        } else {
            Self::Remote(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::Payload(err.to_string())
    }
}
