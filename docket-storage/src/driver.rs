//! Driver capability traits.

use crate::StorageResult;
use async_trait::async_trait;
use docket_model::FieldSpec;
use docket_types::Document;
use std::fmt;
use std::sync::Arc;

/// A CRUD verb a backend may or may not provide for a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert,
    Update,
    Find,
    Remove,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Insert,
        Operation::Update,
        Operation::Find,
        Operation::Remove,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Find => "find",
            Operation::Remove => "remove",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a backend returned from an insert.
#[derive(Debug, Clone, PartialEq)]
pub enum Inserted {
    One(Document),
    /// Backends that answer with a batch; the first element is canonical.
    Many(Vec<Document>),
}

impl Inserted {
    /// The canonical result record.
    pub fn canonical(&self) -> Option<&Document> {
        match self {
            Inserted::One(doc) => Some(doc),
            Inserted::Many(docs) => docs.first(),
        }
    }

    pub fn into_canonical(self) -> Option<Document> {
        match self {
            Inserted::One(doc) => Some(doc),
            Inserted::Many(docs) => docs.into_iter().next(),
        }
    }
}

/// Inserts (or upserts) a whole record, `_id` included when known.
#[async_trait]
pub trait InsertOp: Send + Sync {
    async fn insert(&self, record: Document) -> StorageResult<Inserted>;
}

/// Shallow-merges `changes` into every record matching `selector`.
/// Returns the number of records touched.
#[async_trait]
pub trait UpdateOp: Send + Sync {
    async fn update(&self, selector: Document, changes: Document) -> StorageResult<u64>;
}

/// Returns every record whose top-level keys equal those in `selector`.
#[async_trait]
pub trait FindOp: Send + Sync {
    async fn find(&self, selector: Document) -> StorageResult<Vec<Document>>;
}

/// Deletes every record matching `selector`. Returns the number removed.
#[async_trait]
pub trait RemoveOp: Send + Sync {
    async fn remove(&self, selector: Document) -> StorageResult<u64>;
}

/// The operations a backend provides for one collection.
///
/// Absent operations are `None`; callers decide how to report them.
#[derive(Clone, Default)]
pub struct CollectionOps {
    pub insert: Option<Arc<dyn InsertOp>>,
    pub update: Option<Arc<dyn UpdateOp>>,
    pub find: Option<Arc<dyn FindOp>>,
    pub remove: Option<Arc<dyn RemoveOp>>,
}

impl CollectionOps {
    /// Returns true if the backend provides `op`.
    pub fn supports(&self, op: Operation) -> bool {
        match op {
            Operation::Insert => self.insert.is_some(),
            Operation::Update => self.update.is_some(),
            Operation::Find => self.find.is_some(),
            Operation::Remove => self.remove.is_some(),
        }
    }

    /// Operations the backend does not provide.
    pub fn missing(&self) -> Vec<Operation> {
        Operation::ALL
            .into_iter()
            .filter(|op| !self.supports(*op))
            .collect()
    }
}

impl fmt::Debug for CollectionOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionOps")
            .field("insert", &self.insert.is_some())
            .field("update", &self.update.is_some())
            .field("find", &self.find.is_some())
            .field("remove", &self.remove.is_some())
            .finish()
    }
}

/// An open database on some backend.
pub trait DriverHandle: Send + Sync {
    /// Name the handle was opened with.
    fn db_name(&self) -> &str;

    /// Whether the backend assigns record identifiers itself.
    fn has_id(&self) -> bool {
        false
    }

    /// Resolves the operations available for `collection`.
    fn collection(&self, collection: &str) -> CollectionOps;

    /// Called once when a collection is defined on this handle, for
    /// backends that need to introspect the field spec.
    fn wrap_schema(&self, collection: &str, spec: &FieldSpec) {
        let _ = (collection, spec);
    }
}

/// A storage backend.
pub trait Driver: Send + Sync {
    /// Opens (or reuses) the database called `db_name`.
    fn open(&self, db_name: &str) -> StorageResult<Arc<dyn DriverHandle>>;
}
