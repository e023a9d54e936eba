//! Error types for the engine.

use docket_model::SpecError;
use docket_storage::{Operation, StorageError};
use thiserror::Error;

/// Result type for engine operations.
pub type DbResult<T> = Result<T, DbError>;

/// Errors surfaced by registries, collections and records.
#[derive(Debug, Error)]
pub enum DbError {
    /// The field spec was rejected at definition time.
    #[error("invalid field spec: {0}")]
    Spec(#[from] SpecError),

    /// The backend failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The backend does not provide the requested operation.
    #[error("no {operation} method defined for collection `{collection}` on this driver")]
    Unsupported {
        collection: String,
        operation: Operation,
    },

    /// Configuration could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration parsed but holds an unusable value.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
