//! In-process reference backend.
//!
//! Databases live for as long as the driver. Records are keyed by `_id`
//! and kept in insertion order. Useful for tests and as a model for real
//! drivers.

use crate::{
    CollectionOps, Driver, DriverHandle, FindOp, InsertOp, Inserted, Operation, RemoveOp,
    StorageError, StorageResult, UpdateOp,
};
use async_trait::async_trait;
use docket_model::FieldSpec;
use docket_types::{Document, RecordId, ID_KEY};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

type Records = IndexMap<String, Document>;

#[derive(Debug, Default)]
struct MemoryDatabase {
    collections: RwLock<HashMap<String, Records>>,
}

/// A driver keeping every database in memory.
#[derive(Debug, Default)]
pub struct MemoryDriver {
    databases: Mutex<HashMap<String, Arc<MemoryHandle>>>,
    assign_ids: bool,
    disabled: HashSet<Operation>,
}

impl MemoryDriver {
    /// Creates a driver that expects callers to supply identifiers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a driver that assigns UUID v7 identifiers to records
    /// inserted without one.
    pub fn with_assigned_ids() -> Self {
        Self {
            assign_ids: true,
            ..Self::default()
        }
    }

    /// Withholds `op` from every collection, modelling a partial backend.
    pub fn without(mut self, op: Operation) -> Self {
        self.disabled.insert(op);
        self
    }

    /// Opens `db_name` and returns the concrete handle.
    pub fn open_memory(&self, db_name: &str) -> StorageResult<Arc<MemoryHandle>> {
        let mut databases = self.databases.lock().map_err(|_| StorageError::Open {
            name: db_name.to_string(),
            reason: "driver lock poisoned".to_string(),
        })?;

        let handle = databases.entry(db_name.to_string()).or_insert_with(|| {
            debug!(db = %db_name, "Opening in-memory database");
            Arc::new(MemoryHandle {
                db_name: db_name.to_string(),
                db: Arc::new(MemoryDatabase::default()),
                assign_ids: self.assign_ids,
                disabled: self.disabled.clone(),
                schemas: Mutex::new(HashMap::new()),
            })
        });
        Ok(Arc::clone(handle))
    }
}

impl Driver for MemoryDriver {
    fn open(&self, db_name: &str) -> StorageResult<Arc<dyn DriverHandle>> {
        let handle: Arc<dyn DriverHandle> = self.open_memory(db_name)?;
        Ok(handle)
    }
}

/// One open in-memory database.
#[derive(Debug)]
pub struct MemoryHandle {
    db_name: String,
    db: Arc<MemoryDatabase>,
    assign_ids: bool,
    disabled: HashSet<Operation>,
    schemas: Mutex<HashMap<String, FieldSpec>>,
}

impl MemoryHandle {
    /// The spec most recently registered for `collection` via `wrap_schema`.
    pub fn schema(&self, collection: &str) -> Option<FieldSpec> {
        self.schemas.lock().ok()?.get(collection).cloned()
    }

    /// Number of records stored in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        self.db
            .collections
            .read()
            .await
            .get(collection)
            .map_or(0, IndexMap::len)
    }
}

impl DriverHandle for MemoryHandle {
    fn db_name(&self) -> &str {
        &self.db_name
    }

    fn has_id(&self) -> bool {
        self.assign_ids
    }

    fn collection(&self, collection: &str) -> CollectionOps {
        let ops = Arc::new(MemoryCollection {
            name: collection.to_string(),
            db: Arc::clone(&self.db),
            assign_ids: self.assign_ids,
        });
        let enabled = |op: Operation| !self.disabled.contains(&op);

        CollectionOps {
            insert: enabled(Operation::Insert).then(|| Arc::clone(&ops) as Arc<dyn InsertOp>),
            update: enabled(Operation::Update).then(|| Arc::clone(&ops) as Arc<dyn UpdateOp>),
            find: enabled(Operation::Find).then(|| Arc::clone(&ops) as Arc<dyn FindOp>),
            remove: enabled(Operation::Remove).then(|| ops as Arc<dyn RemoveOp>),
        }
    }

    fn wrap_schema(&self, collection: &str, spec: &FieldSpec) {
        if let Ok(mut schemas) = self.schemas.lock() {
            schemas.insert(collection.to_string(), spec.clone());
        }
    }
}

struct MemoryCollection {
    name: String,
    db: Arc<MemoryDatabase>,
    assign_ids: bool,
}

fn matches(record: &Document, selector: &Document) -> bool {
    selector
        .iter()
        .all(|(key, expected)| record.get(key) == Some(expected))
}

#[async_trait]
impl InsertOp for MemoryCollection {
    async fn insert(&self, mut record: Document) -> StorageResult<Inserted> {
        let id = match record.get(ID_KEY).and_then(RecordId::from_value) {
            Some(id) => id,
            None if self.assign_ids => RecordId::new(Uuid::now_v7().simple().to_string()),
            None => {
                return Err(StorageError::MissingId {
                    collection: self.name.clone(),
                });
            }
        };

        record.shift_remove(ID_KEY);
        let mut stored = Document::with_capacity(record.len() + 1);
        stored.insert(ID_KEY.to_string(), id.to_value());
        stored.extend(record);

        let mut collections = self.db.collections.write().await;
        let previous = collections
            .entry(self.name.clone())
            .or_default()
            .insert(id.as_str().to_string(), stored.clone());
        debug!(collection = %self.name, id = %id, replaced = previous.is_some(), "Stored record");

        Ok(Inserted::One(stored))
    }
}

#[async_trait]
impl UpdateOp for MemoryCollection {
    async fn update(&self, selector: Document, mut changes: Document) -> StorageResult<u64> {
        changes.shift_remove(ID_KEY);

        let mut collections = self.db.collections.write().await;
        let Some(records) = collections.get_mut(&self.name) else {
            return Ok(0);
        };

        let mut touched = 0;
        for record in records.values_mut().filter(|r| matches(r, &selector)) {
            for (key, value) in &changes {
                record.insert(key.clone(), value.clone());
            }
            touched += 1;
        }
        Ok(touched)
    }
}

#[async_trait]
impl FindOp for MemoryCollection {
    async fn find(&self, selector: Document) -> StorageResult<Vec<Document>> {
        let collections = self.db.collections.read().await;
        Ok(collections
            .get(&self.name)
            .map(|records| {
                records
                    .values()
                    .filter(|r| matches(r, &selector))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl RemoveOp for MemoryCollection {
    async fn remove(&self, selector: Document) -> StorageResult<u64> {
        let mut collections = self.db.collections.write().await;
        let Some(records) = collections.get_mut(&self.name) else {
            return Ok(0);
        };

        let before = records.len();
        records.retain(|_, r| !matches(r, &selector));
        Ok((before - records.len()) as u64)
    }
}
