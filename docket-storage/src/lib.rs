//! Storage driver interface for Docket.
//!
//! Backends plug in through an explicit capability interface instead of
//! being probed for methods at runtime:
//!
//! - [`Driver`] opens a [`DriverHandle`] per database name
//! - a handle hands out [`CollectionOps`], one optional operation per CRUD verb
//! - each operation is an async trait object ([`InsertOp`], [`UpdateOp`], [`FindOp`], [`RemoveOp`])
//!
//! [`MemoryDriver`] is the in-process reference backend.

mod driver;
mod error;
mod memory;

pub use driver::{
    CollectionOps, Driver, DriverHandle, FindOp, InsertOp, Inserted, Operation, RemoveOp, UpdateOp,
};
pub use error::{StorageError, StorageResult};
pub use memory::{MemoryDriver, MemoryHandle};
