use crate::{SpecError, SpecResult};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Declarative description of a collection's shape.
///
/// Field order is significant: it fixes the order of normalized output
/// and of the safe-field whitelist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub fields: IndexMap<String, FieldDef>,
    /// Backend-specific database selector. Falls back to the configured
    /// default database when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db: Option<String>,
}

impl FieldSpec {
    /// Creates an empty spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a field, replacing any earlier declaration of the same name
    /// in place.
    pub fn field(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.fields.insert(name.into(), def);
        self
    }

    /// Selects the backend database for this collection.
    pub fn db(mut self, name: impl Into<String>) -> Self {
        self.db = Some(name.into());
        self
    }

    /// Parses and validates a spec from JSON.
    ///
    /// A document without a `fields` object is rejected here rather than
    /// when the first record is created.
    pub fn from_json(json: &str) -> SpecResult<Self> {
        let spec: Self = serde_json::from_str(json)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Checks the structural rules serde cannot express.
    pub fn validate(&self) -> SpecResult<()> {
        for (name, def) in &self.fields {
            if name.is_empty() {
                return Err(SpecError::EmptyFieldName);
            }
            if def.synonyms.iter().any(String::is_empty) {
                return Err(SpecError::EmptySynonym {
                    field: name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Returns true if `name` is a declared field.
    pub fn declares(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }
}

/// Declaration of a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the field may appear in serialized output.
    #[serde(default)]
    pub safe: bool,
    /// Alternate input keys that populate this field.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
    /// Transform names applied in order. Only honoured on text fields.
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub transform: Vec<String>,
}

impl FieldDef {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            safe: false,
            synonyms: Vec::new(),
            transform: Vec::new(),
        }
    }

    /// Shorthand for a text field.
    pub fn text() -> Self {
        Self::new(FieldType::Text)
    }

    /// Shorthand for a numeric field.
    pub fn number() -> Self {
        Self::new(FieldType::Number)
    }

    /// Shorthand for a boolean field.
    pub fn boolean() -> Self {
        Self::new(FieldType::Boolean)
    }

    /// Shorthand for a list-of-text field.
    pub fn list() -> Self {
        Self::new(FieldType::List)
    }

    /// Shorthand for a structured (nested object) field.
    pub fn structured() -> Self {
        Self::new(FieldType::Structured)
    }

    /// Shorthand for a date field.
    pub fn date() -> Self {
        Self::new(FieldType::Date)
    }

    /// Marks the field as safe for serialized output.
    pub fn safe(mut self) -> Self {
        self.safe = true;
        self
    }

    pub fn synonyms<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn transform<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transform = names.into_iter().map(Into::into).collect();
        self
    }
}

/// The declared type of a field.
///
/// Types are whitelisting metadata; values are not coerced or checked
/// against them, except that transforms only run on [`FieldType::Text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    #[serde(alias = "string")]
    Text,
    Number,
    #[serde(alias = "bool")]
    Boolean,
    /// A list of text values.
    #[serde(alias = "array")]
    List,
    #[serde(alias = "object")]
    Structured,
    Date,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(name) => vec![name],
        OneOrMany::Many(names) => names,
    })
}
