//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend-specific failure.
    #[error("backend error: {0}")]
    Backend(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A record reached a backend that does not assign identifiers
    /// without carrying one.
    #[error("record in `{collection}` has no identifier")]
    MissingId { collection: String },

    /// Database could not be opened.
    #[error("cannot open database `{name}`: {reason}")]
    Open { name: String, reason: String },
}
