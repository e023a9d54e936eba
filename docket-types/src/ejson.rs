//! Extended JSON codec.
//!
//! Plain JSON plus typed values encoded as single-key marker objects:
//!
//! ```json
//! {"created": {"$date": 1700000000000}}
//! ```
//!
//! A user object that would be mistaken for a marker is wrapped as
//! `{"$escape": {...}}` on the way out and unwrapped on the way in.

use crate::{Document, Error, Result, Value};
use chrono::{DateTime, Utc};
use serde_json::{Map, Number};

const DATE_KEY: &str = "$date";
const ESCAPE_KEY: &str = "$escape";

/// Output options for [`stringify`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringifyOptions {
    /// Pretty-print with two-space indentation.
    pub indent: bool,
    /// Sort object keys recursively.
    pub canonical: bool,
}

impl StringifyOptions {
    #[must_use]
    pub const fn pretty() -> Self {
        Self {
            indent: true,
            canonical: false,
        }
    }

    #[must_use]
    pub const fn canonical() -> Self {
        Self {
            indent: false,
            canonical: true,
        }
    }
}

/// Serializes a document to extended JSON text.
pub fn stringify(doc: &Document, options: &StringifyOptions) -> String {
    let mut json = escape_marker(document_to_json(doc));
    if options.canonical {
        json = sort_keys(json);
    }

    let json = serde_json::Value::Object(json);
    if options.indent {
        serde_json::to_string_pretty(&json)
    } else {
        serde_json::to_string(&json)
    }
    .unwrap_or_else(|_| "{}".to_string())
}

/// Parses extended JSON text into a document.
///
/// The top level must be a JSON object.
pub fn parse(text: &str) -> Result<Document> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    match from_json_value(json)? {
        Value::Structured(doc) => Ok(doc),
        other => Err(Error::InvalidDocument(format!(
            "expected an object at the top level, found {}",
            kind(&other)
        ))),
    }
}

/// Converts a value into its extended JSON representation.
pub fn to_json_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => serde_json::Value::Number(n.clone()),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::List(items) => serde_json::Value::Array(items.iter().map(to_json_value).collect()),
        Value::Structured(doc) => serde_json::Value::Object(escape_marker(document_to_json(doc))),
        Value::Date(d) => {
            let mut obj = Map::new();
            obj.insert(DATE_KEY.to_string(), Number::from(d.timestamp_millis()).into());
            serde_json::Value::Object(obj)
        }
    }
}

/// Converts extended JSON back into a value, decoding marker objects.
pub fn from_json_value(json: serde_json::Value) -> Result<Value> {
    Ok(match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => Value::Number(n),
        serde_json::Value::String(s) => Value::Text(s),
        serde_json::Value::Array(items) => Value::List(
            items
                .into_iter()
                .map(from_json_value)
                .collect::<Result<_>>()?,
        ),
        serde_json::Value::Object(mut obj) => {
            if obj.len() == 1 {
                if let Some(millis) = obj.get(DATE_KEY) {
                    return decode_date(millis).map(Value::Date);
                }
                if matches!(obj.get(ESCAPE_KEY), Some(serde_json::Value::Object(_))) {
                    if let Some(serde_json::Value::Object(inner)) = obj.remove(ESCAPE_KEY) {
                        return Ok(Value::Structured(json_to_document(inner)?));
                    }
                }
            }
            Value::Structured(json_to_document(obj)?)
        }
    })
}

fn document_to_json(doc: &Document) -> Map<String, serde_json::Value> {
    doc.iter()
        .map(|(k, v)| (k.clone(), to_json_value(v)))
        .collect()
}

fn json_to_document(obj: Map<String, serde_json::Value>) -> Result<Document> {
    obj.into_iter()
        .map(|(k, v)| Ok((k, from_json_value(v)?)))
        .collect()
}

/// Wraps an object that would otherwise decode as a marker.
fn escape_marker(obj: Map<String, serde_json::Value>) -> Map<String, serde_json::Value> {
    if !looks_like_marker(&obj) {
        return obj;
    }
    let mut wrapper = Map::new();
    wrapper.insert(ESCAPE_KEY.to_string(), serde_json::Value::Object(obj));
    wrapper
}

fn looks_like_marker(obj: &Map<String, serde_json::Value>) -> bool {
    obj.len() == 1 && (obj.contains_key(DATE_KEY) || obj.contains_key(ESCAPE_KEY))
}

fn decode_date(millis: &serde_json::Value) -> Result<DateTime<Utc>> {
    let ms = millis
        .as_i64()
        .or_else(|| millis.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
        .ok_or_else(|| Error::InvalidDate(format!("expected epoch milliseconds, found {millis}")))?;
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| Error::InvalidDate(format!("{ms} is out of range")))
}

fn sort_keys(obj: Map<String, serde_json::Value>) -> Map<String, serde_json::Value> {
    let mut entries: Vec<_> = obj.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
        .into_iter()
        .map(|(k, v)| (k, sort_nested(v)))
        .collect()
}

fn sort_nested(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(obj) => serde_json::Value::Object(sort_keys(obj)),
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(sort_nested).collect())
        }
        other => other,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::Text(_) => "a string",
        Value::List(_) => "an array",
        Value::Structured(_) => "an object",
        Value::Date(_) => "a date",
    }
}
