//! Schema-normalized records over a pluggable storage backend.
//!
//! - [`Registry`]: name → [`Collection`] map, filled during initialization
//! - [`Collection`]: a field spec bound to a driver handle; creates records and forwards CRUD
//! - [`Record`]: normalized mutation, safe serialization and `save`
//! - [`DbConfig`]: default database name and identifier length
//!
//! ```no_run
//! use docket_db::{DbConfig, Registry};
//! use docket_model::{FieldDef, FieldSpec};
//! use docket_storage::MemoryDriver;
//! use docket_types::ejson::StringifyOptions;
//! use std::sync::Arc;
//!
//! # async fn demo() -> docket_db::DbResult<()> {
//! let mut registry = Registry::new(Arc::new(MemoryDriver::new()), DbConfig::default());
//! let users = registry.define(
//!     "users",
//!     &FieldSpec::new().field("user", FieldDef::text().safe().synonyms(["username"])),
//! )?;
//!
//! let mut record = users.create(r#"{"username": "bob"}"#);
//! record.save().await?;
//! println!("{}", record.serialize(&StringifyOptions::default()));
//! # Ok(())
//! # }
//! ```

mod collection;
mod config;
mod error;
mod record;
mod registry;

pub use collection::Collection;
pub use config::DbConfig;
pub use error::{DbError, DbResult};
pub use record::{Patch, Record, Saved};
pub use registry::Registry;
