use crate::record::{Patch, Record};
use crate::{DbError, DbResult};
use docket_model::{FieldSpec, SchemaDescriptor};
use docket_storage::{CollectionOps, DriverHandle, Inserted, Operation};
use docket_types::{Document, IdGenerator, RecordId, ID_KEY};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

/// A schema bound to a backend handle.
///
/// Constructs [`Record`]s and forwards CRUD calls to the backend. The
/// descriptor and the backend's operations are resolved once, here, and
/// shared by every record the collection creates. Cloning is cheap.
#[derive(Clone)]
pub struct Collection {
    inner: Arc<Inner>,
}

struct Inner {
    name: String,
    spec: FieldSpec,
    descriptor: SchemaDescriptor,
    handle: Arc<dyn DriverHandle>,
    ops: CollectionOps,
    ids: IdGenerator,
}

impl Collection {
    /// Binds `spec` to `handle` under `name`.
    ///
    /// The spec is validated here so malformed definitions fail before any
    /// record exists. Missing backend operations are not an error until
    /// they are called.
    pub fn new(
        name: impl Into<String>,
        spec: FieldSpec,
        handle: Arc<dyn DriverHandle>,
        ids: IdGenerator,
    ) -> DbResult<Self> {
        let name = name.into();
        spec.validate()?;

        let descriptor = SchemaDescriptor::derive(&spec);
        handle.wrap_schema(&name, &spec);
        let ops = handle.collection(&name);

        let missing = ops.missing();
        if !missing.is_empty() {
            debug!(collection = %name, ?missing, "Driver lacks some operations");
        }

        Ok(Self {
            inner: Arc::new(Inner {
                name,
                spec,
                descriptor,
                handle,
                ops,
                ids,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn spec(&self) -> &FieldSpec {
        &self.inner.spec
    }

    pub fn descriptor(&self) -> &SchemaDescriptor {
        &self.inner.descriptor
    }

    /// Name of the database this collection lives in.
    pub fn db_name(&self) -> &str {
        self.inner.handle.db_name()
    }

    /// Whether the backend assigns identifiers for this collection.
    pub fn has_id(&self) -> bool {
        self.inner.handle.has_id()
    }

    /// Returns true if both values refer to the same definition.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Creates a record from raw input.
    ///
    /// The input is normalized through [`SchemaDescriptor::force`]. An `_id`
    /// in the input is adopted and marks the record as existing. Without
    /// one, a local identifier is generated unless the backend assigns its
    /// own on save.
    pub fn create(&self, value: impl Into<Patch>) -> Record {
        let raw = value.into().into_document();
        let supplied = raw.get(ID_KEY).and_then(RecordId::from_value);

        let mut record = Record::empty(self.clone());
        record.merge(&raw);

        match supplied {
            Some(id) => record.adopt(id),
            None if !self.has_id() => record.assign(self.inner.ids.generate()),
            None => {}
        }
        record
    }

    /// Forwards a raw insert to the backend.
    pub async fn insert(&self, record: Document) -> DbResult<Inserted> {
        let op = self.require(&self.inner.ops.insert, Operation::Insert)?;
        Ok(op.insert(record).await?)
    }

    /// Shallow-merges `changes` into every record matching `selector`.
    pub async fn update(&self, selector: Document, changes: Document) -> DbResult<u64> {
        let op = self.require(&self.inner.ops.update, Operation::Update)?;
        Ok(op.update(selector, changes).await?)
    }

    /// Returns raw backend documents matching `selector`.
    pub async fn find(&self, selector: Document) -> DbResult<Vec<Document>> {
        let op = self.require(&self.inner.ops.find, Operation::Find)?;
        Ok(op.find(selector).await?)
    }

    /// Like [`Collection::find`], but hydrates each document into a record.
    pub async fn find_records(&self, selector: Document) -> DbResult<Vec<Record>> {
        let docs = self.find(selector).await?;
        Ok(docs.into_iter().map(|doc| self.create(doc)).collect())
    }

    pub async fn remove(&self, selector: Document) -> DbResult<u64> {
        let op = self.require(&self.inner.ops.remove, Operation::Remove)?;
        Ok(op.remove(selector).await?)
    }

    pub(crate) fn require<'a, T: ?Sized>(
        &self,
        slot: &'a Option<Arc<T>>,
        operation: Operation,
    ) -> DbResult<&'a Arc<T>> {
        slot.as_ref().ok_or_else(|| {
            error!(collection = %self.inner.name, "No {} method defined for this driver", operation);
            DbError::Unsupported {
                collection: self.inner.name.clone(),
                operation,
            }
        })
    }

    pub(crate) fn ops(&self) -> &CollectionOps {
        &self.inner.ops
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.inner.name)
            .field("db", &self.inner.handle.db_name())
            .field("ops", &self.inner.ops)
            .finish()
    }
}
