use crate::{Collection, DbResult};
use docket_storage::Operation;
use docket_types::ejson::{self, StringifyOptions};
use docket_types::{Document, RecordId, Value, ID_KEY};
use std::sync::Arc;
use tracing::warn;

/// Input accepted by [`Record::set`] and [`Collection::create`].
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    Document(Document),
    /// Extended JSON text, as read back from a backend.
    Serialized(String),
}

impl Patch {
    /// Resolves the patch to a document.
    ///
    /// Text that fails to parse is logged and becomes an empty document.
    pub fn into_document(self) -> Document {
        match self {
            Patch::Document(doc) => doc,
            Patch::Serialized(text) => ejson::parse(&text).unwrap_or_else(|e| {
                warn!(error = %e, payload = %text, "Failed to deserialize record, using an empty one");
                Document::new()
            }),
        }
    }
}

impl From<Document> for Patch {
    fn from(doc: Document) -> Self {
        Patch::Document(doc)
    }
}

impl From<String> for Patch {
    fn from(text: String) -> Self {
        Patch::Serialized(text)
    }
}

impl From<&str> for Patch {
    fn from(text: &str) -> Self {
        Patch::Serialized(text.to_string())
    }
}

/// Outcome of [`Record::save`].
#[derive(Debug, Clone, PartialEq)]
pub enum Saved {
    /// The record had no identifier before the call. Carries the one it
    /// holds now, if the backend assigned it.
    Created { id: Option<RecordId> },
    /// The record already had an identifier, whether adopted from input or
    /// generated locally; carries the backend's canonical result.
    Updated(Option<Document>),
}

/// A schema-bound, mutable record.
///
/// Owned by the caller. The collection that created it is shared, never
/// the other way round.
#[derive(Debug, Clone)]
pub struct Record {
    collection: Collection,
    id: Option<RecordId>,
    fields: Document,
    existing: bool,
}

impl Record {
    pub(crate) fn empty(collection: Collection) -> Self {
        Self {
            collection,
            id: None,
            fields: Document::new(),
            existing: false,
        }
    }

    pub(crate) fn adopt(&mut self, id: RecordId) {
        self.id = Some(id);
        self.existing = true;
    }

    pub(crate) fn assign(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    pub(crate) fn merge(&mut self, raw: &Document) {
        let normalized = self.collection.descriptor().force(raw);
        self.fields.extend(normalized);
    }

    pub fn id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    /// True once the record is known to the backend: it was read back with
    /// an identifier, or a save has succeeded.
    pub fn is_existing(&self) -> bool {
        self.existing
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Normalizes `patch` and merges it over the current fields, key by key.
    pub fn set(&mut self, patch: impl Into<Patch>) -> &mut Self {
        let raw = patch.into().into_document();
        self.merge(&raw);
        self
    }

    /// Assigns `value` at a dot-separated path, creating intermediate
    /// structured values as needed. Intermediate values that are not
    /// structured are replaced.
    ///
    /// Unlike [`Record::set`] this performs no synonym resolution,
    /// whitelisting or transforms: the path and value are stored as given.
    pub fn set_path(&mut self, path: &str, value: impl Into<Value>) -> &mut Self {
        let mut parts: Vec<&str> = path.split('.').collect();
        let leaf = parts.pop().unwrap_or_default();
        insert_path(&mut self.fields, &parts, leaf, value.into());
        self
    }

    /// Appends `value` to the list at `key`, creating the list if the field
    /// is absent or falsy. A non-list value already present becomes the
    /// first element of the new list.
    ///
    /// The pushed value is not normalized.
    pub fn set_push(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        let slot = self.fields.entry(key.to_string()).or_default();

        if let Value::List(items) = slot {
            items.push(value);
        } else if slot.is_truthy() {
            let previous = std::mem::take(slot);
            *slot = Value::List(vec![previous, value]);
        } else {
            *slot = Value::List(vec![value]);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// All fields with the identifier under `_id`, first.
    pub fn get_all(&self) -> Document {
        let mut all = Document::with_capacity(self.fields.len() + 1);
        if let Some(id) = &self.id {
            all.insert(ID_KEY.to_string(), id.to_value());
        }
        all.extend(self.fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        all
    }

    pub fn fields(&self) -> &Document {
        &self.fields
    }

    /// Only the whitelisted fields, in whitelist order.
    pub fn to_safe(&self) -> Document {
        self.collection.descriptor().pick_safe(&self.fields)
    }

    /// Extended JSON of the identifier plus the safe fields.
    pub fn serialize(&self, options: &StringifyOptions) -> String {
        let mut out = Document::new();
        if let Some(id) = &self.id {
            out.insert(ID_KEY.to_string(), id.to_value());
        }
        out.extend(self.to_safe());
        ejson::stringify(&out, options)
    }

    /// Persists the whole record through the backend's insert.
    ///
    /// The outcome depends on whether the record held an identifier before
    /// the call. An identifier returned by the backend is adopted only when
    /// the record had none. Backend failures are returned unchanged and
    /// never retried.
    pub async fn save(&mut self) -> DbResult<Saved> {
        let identified = self.id.is_some();
        let insert = Arc::clone(
            self.collection
                .require(&self.collection.ops().insert, Operation::Insert)?,
        );

        let result = insert.insert(self.get_all()).await?;
        let canonical = result.into_canonical();

        if self.id.is_none() {
            self.id = canonical
                .as_ref()
                .and_then(|doc| doc.get(ID_KEY))
                .and_then(RecordId::from_value);
        }
        if self.id.is_some() {
            self.existing = true;
        }

        Ok(if identified {
            Saved::Updated(canonical)
        } else {
            Saved::Created {
                id: self.id.clone(),
            }
        })
    }
}

fn insert_path(doc: &mut Document, parents: &[&str], leaf: &str, value: Value) {
    let Some((head, rest)) = parents.split_first() else {
        doc.insert(leaf.to_string(), value);
        return;
    };

    match doc.entry((*head).to_string()).or_default() {
        Value::Structured(inner) => insert_path(inner, rest, leaf, value),
        slot => {
            let mut inner = Document::new();
            insert_path(&mut inner, rest, leaf, value);
            *slot = Value::Structured(inner);
        }
    }
}
