//! Error types for field spec definition.

use thiserror::Error;

/// Result type for spec operations.
pub type SpecResult<T> = Result<T, SpecError>;

/// Errors raised when a field spec is defined.
#[derive(Debug, Error)]
pub enum SpecError {
    /// The spec document could not be parsed (e.g. `fields` is missing).
    #[error("malformed field spec: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A field was declared with an empty name.
    #[error("field names must not be empty")]
    EmptyFieldName,

    /// A synonym list contains an empty name.
    #[error("field `{field}` declares an empty synonym")]
    EmptySynonym { field: String },
}
