//! Core type definitions for Docket.
//!
//! This crate defines the backend-agnostic types every other Docket crate
//! builds on:
//! - Record identifiers and the random hex [`IdGenerator`]
//! - The [`Value`] / [`Document`] data model held by records
//! - The extended-JSON codec ([`ejson`]) used for serialized records
//!
//! Nothing here knows about schemas or storage drivers.

pub mod ejson;
mod ids;
mod value;

pub use ids::{IdGenerator, RecordId, ID_KEY};
pub use value::{Document, Value};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),
}
