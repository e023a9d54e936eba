//! Schema model for Docket.
//!
//! Defines the declarative side of a collection and the normalization
//! derived from it:
//! - [`FieldSpec`] and [`FieldDef`]: a collection's declared fields (type, safe flag, synonyms, transforms)
//! - [`SchemaDescriptor`]: synonym table and safe whitelist, derived once per definition
//! - [`Transform`]: the closed set of text normalizations a field may request
//!
//! Storage and record lifecycle live in `docket-storage` and `docket-db`.

mod error;
mod schema;
mod spec;
mod transform;

pub use error::{SpecError, SpecResult};
pub use schema::{SchemaDescriptor, SynonymEntry};
pub use spec::{FieldDef, FieldSpec, FieldType};
pub use transform::{Transform, UnknownTransform};
