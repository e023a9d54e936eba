use async_trait::async_trait;
use docket_db::{DbConfig, DbError, Registry, Saved};
use docket_model::{FieldDef, FieldSpec};
use docket_storage::{
    CollectionOps, Driver, DriverHandle, InsertOp, Inserted, MemoryDriver, Operation,
    StorageError, StorageResult,
};
use docket_types::{Document, Value, ID_KEY};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};

fn doc(pairs: Vec<(&str, Value)>) -> Document {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn make_spec() -> FieldSpec {
    FieldSpec::new()
        .field("title", FieldDef::text().safe().transform(["trim"]))
        .field("count", FieldDef::number())
}

/// A driver whose insert answers with a fixed batch and records what it saw.
struct BatchDriver {
    reply: Vec<Document>,
    seen: Arc<Mutex<Vec<Document>>>,
    fail: bool,
}

struct BatchHandle {
    reply: Vec<Document>,
    seen: Arc<Mutex<Vec<Document>>>,
    fail: bool,
}

struct BatchInsert {
    reply: Vec<Document>,
    seen: Arc<Mutex<Vec<Document>>>,
    fail: bool,
}

impl Driver for BatchDriver {
    fn open(&self, _db_name: &str) -> StorageResult<Arc<dyn DriverHandle>> {
        Ok(Arc::new(BatchHandle {
            reply: self.reply.clone(),
            seen: Arc::clone(&self.seen),
            fail: self.fail,
        }))
    }
}

impl DriverHandle for BatchHandle {
    fn db_name(&self) -> &str {
        "batch"
    }

    fn has_id(&self) -> bool {
        true
    }

    fn collection(&self, _collection: &str) -> CollectionOps {
        CollectionOps {
            insert: Some(Arc::new(BatchInsert {
                reply: self.reply.clone(),
                seen: Arc::clone(&self.seen),
                fail: self.fail,
            })),
            ..CollectionOps::default()
        }
    }
}

#[async_trait]
impl InsertOp for BatchInsert {
    async fn insert(&self, record: Document) -> StorageResult<Inserted> {
        self.seen.lock().unwrap().push(record);
        if self.fail {
            return Err(StorageError::Backend("disk full".into()));
        }
        Ok(Inserted::Many(self.reply.clone()))
    }
}

fn batch_registry(reply: Vec<Document>, fail: bool) -> (Registry, Arc<Mutex<Vec<Document>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let driver = BatchDriver {
        reply,
        seen: Arc::clone(&seen),
        fail,
    };
    (Registry::new(Arc::new(driver), DbConfig::default()), seen)
}

// ── Memory backend ───────────────────────────────────────────────

#[tokio::test]
async fn save_new_record_with_local_id_returns_backend_result() {
    let driver = Arc::new(MemoryDriver::new());
    let mut registry = Registry::new(driver.clone(), DbConfig::default());
    let notes = registry.define("notes", &make_spec()).unwrap();

    let mut record = notes.create(doc(vec![("title", Value::from("  hello  "))]));
    let id = record.id().cloned().unwrap();
    assert!(!record.is_existing());

    // Identified before the call, so the backend's own result comes back.
    let saved = record.save().await.unwrap();
    assert_eq!(
        saved,
        Saved::Updated(Some(doc(vec![
            (ID_KEY, id.to_value()),
            ("title", Value::from("hello")),
        ])))
    );
    assert_eq!(record.id(), Some(&id));
    assert!(record.is_existing());

    let handle = driver.open_memory("docket").unwrap();
    assert_eq!(handle.count("notes").await, 1);
}

#[tokio::test]
async fn save_adopts_backend_assigned_id() {
    let mut registry = Registry::new(
        Arc::new(MemoryDriver::with_assigned_ids()),
        DbConfig::default(),
    );
    let notes = registry.define("notes", &make_spec()).unwrap();

    let mut record = notes.create(doc(vec![("title", Value::from("x"))]));
    assert_eq!(record.id(), None);

    let saved = record.save().await.unwrap();
    let id = record.id().cloned().expect("backend should have assigned an id");
    assert_eq!(saved, Saved::Created { id: Some(id.clone()) });
    assert!(record.is_existing());

    let stored = notes
        .find(doc(vec![(ID_KEY, id.to_value())]))
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["title"], Value::from("x"));
}

#[tokio::test]
async fn second_save_reports_update_with_backend_result() {
    let mut registry = Registry::new(Arc::new(MemoryDriver::new()), DbConfig::default());
    let notes = registry.define("notes", &make_spec()).unwrap();

    let mut record = notes.create(doc(vec![("count", Value::from(1i64))]));
    record.save().await.unwrap();
    record.set(doc(vec![("count", Value::from(2i64))]));

    match record.save().await.unwrap() {
        Saved::Updated(Some(result)) => {
            assert_eq!(result[ID_KEY], record.id().unwrap().to_value());
            assert_eq!(result["count"], Value::from(2i64));
        }
        other => panic!("expected an update, got {other:?}"),
    }
    assert_eq!(notes.find(Document::new()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn saving_a_read_record_is_an_update() {
    let mut registry = Registry::new(Arc::new(MemoryDriver::new()), DbConfig::default());
    let notes = registry.define("notes", &make_spec()).unwrap();

    notes
        .insert(doc(vec![(ID_KEY, Value::from("n1")), ("title", Value::from("old"))]))
        .await
        .unwrap();

    let mut records = notes.find_records(Document::new()).await.unwrap();
    assert_eq!(records.len(), 1);
    let record = &mut records[0];
    assert!(record.is_existing());

    record.set(doc(vec![("title", Value::from("new"))]));
    assert!(matches!(record.save().await.unwrap(), Saved::Updated(_)));

    let stored = notes.find(doc(vec![(ID_KEY, Value::from("n1"))])).await.unwrap();
    assert_eq!(stored[0]["title"], Value::from("new"));
}

#[tokio::test]
async fn save_without_insert_operation_is_unsupported() {
    let mut registry = Registry::new(
        Arc::new(MemoryDriver::new().without(Operation::Insert)),
        DbConfig::default(),
    );
    let notes = registry.define("notes", &make_spec()).unwrap();
    let mut record = notes.create(Document::new());

    let err = record.save().await.unwrap_err();
    assert!(matches!(
        err,
        DbError::Unsupported { operation: Operation::Insert, ref collection } if collection == "notes"
    ));
    assert!(!record.is_existing());
}

// ── Custom backends ──────────────────────────────────────────────

#[tokio::test]
async fn batch_result_uses_first_element() {
    let (mut registry, seen) = batch_registry(
        vec![
            doc(vec![(ID_KEY, Value::from("first"))]),
            doc(vec![(ID_KEY, Value::from("second"))]),
        ],
        false,
    );
    let notes = registry.define("notes", &make_spec()).unwrap();
    let mut record = notes.create(doc(vec![("title", Value::from(" t "))]));

    record.save().await.unwrap();
    assert_eq!(record.id().unwrap().as_str(), "first");

    // The backend saw the whole normalized record, without an id.
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        &[doc(vec![("title", Value::from("t"))])]
    );
}

#[tokio::test]
async fn backend_id_does_not_replace_existing_id() {
    let (mut registry, _) = batch_registry(vec![doc(vec![(ID_KEY, Value::from("other"))])], false);
    let notes = registry.define("notes", &make_spec()).unwrap();
    let mut record = notes.create(doc(vec![(ID_KEY, Value::from("mine"))]));

    let saved = record.save().await.unwrap();
    assert_eq!(record.id().unwrap().as_str(), "mine");
    assert_eq!(
        saved,
        Saved::Updated(Some(doc(vec![(ID_KEY, Value::from("other"))])))
    );
}

#[tokio::test]
async fn empty_batch_leaves_record_unidentified() {
    let (mut registry, _) = batch_registry(vec![], false);
    let notes = registry.define("notes", &make_spec()).unwrap();
    let mut record = notes.create(Document::new());

    assert_eq!(record.save().await.unwrap(), Saved::Created { id: None });
    assert!(!record.is_existing());
}

#[tokio::test]
async fn backend_failure_propagates_and_is_not_retried() {
    let (mut registry, seen) = batch_registry(vec![], true);
    let notes = registry.define("notes", &make_spec()).unwrap();
    let mut record = notes.create(Document::new());

    let err = record.save().await.unwrap_err();
    assert!(matches!(err, DbError::Storage(StorageError::Backend(ref m)) if m == "disk full"));
    assert_eq!(seen.lock().unwrap().len(), 1);
    assert_eq!(record.id(), None);
    assert!(!record.is_existing());
}

#[tokio::test]
async fn missing_static_operations_fail_at_call_time() {
    let (mut registry, _) = batch_registry(vec![], false);
    // Defining succeeds even though the driver only offers insert.
    let notes = registry.define("notes", &make_spec()).unwrap();

    assert!(matches!(
        notes.find(Document::new()).await,
        Err(DbError::Unsupported { operation: Operation::Find, .. })
    ));
    assert!(matches!(
        notes.update(Document::new(), Document::new()).await,
        Err(DbError::Unsupported { operation: Operation::Update, .. })
    ));
    assert!(matches!(
        notes.remove(Document::new()).await,
        Err(DbError::Unsupported { operation: Operation::Remove, .. })
    ));
}

// ── Static operations ────────────────────────────────────────────

#[tokio::test]
async fn static_operations_forward_to_backend() {
    let mut registry = Registry::new(Arc::new(MemoryDriver::new()), DbConfig::default());
    let notes = registry.define("notes", &make_spec()).unwrap();

    for id in ["a", "b"] {
        notes
            .insert(doc(vec![(ID_KEY, Value::from(id)), ("count", Value::from(0i64))]))
            .await
            .unwrap();
    }

    let touched = notes
        .update(
            doc(vec![(ID_KEY, Value::from("a"))]),
            doc(vec![("count", Value::from(5i64))]),
        )
        .await
        .unwrap();
    assert_eq!(touched, 1);

    let found = notes.find(doc(vec![("count", Value::from(5i64))])).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0][ID_KEY], Value::from("a"));

    let removed = notes.remove(doc(vec![("count", Value::from(0i64))])).await.unwrap();
    assert_eq!(removed, 1);
    assert_eq!(notes.find(Document::new()).await.unwrap().len(), 1);
}
