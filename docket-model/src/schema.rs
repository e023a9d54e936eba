use crate::{FieldSpec, FieldType, Transform};
use docket_types::{Document, Value};
use tracing::debug;

/// A field together with the alternate input keys that populate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymEntry {
    pub field: String,
    pub synonyms: Vec<String>,
}

/// Artifacts derived once from a [`FieldSpec`] when a collection is defined.
///
/// Holds the synonym table, the safe-field whitelist, and the resolved
/// transform chains. Records never re-derive these.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    synonyms: Vec<SynonymEntry>,
    whitelist: Vec<String>,
    declared: Vec<String>,
    transforms: Vec<(String, Vec<Transform>)>,
}

impl SchemaDescriptor {
    /// Derives the descriptor from a spec. Pure and deterministic.
    pub fn derive(spec: &FieldSpec) -> Self {
        let synonyms = spec
            .fields
            .iter()
            .filter(|(_, def)| !def.synonyms.is_empty())
            .map(|(name, def)| SynonymEntry {
                field: name.clone(),
                synonyms: def.synonyms.clone(),
            })
            .collect();

        let whitelist = spec
            .fields
            .iter()
            .filter(|(_, def)| def.safe)
            .map(|(name, _)| name.clone())
            .collect();

        let declared = spec.fields.keys().cloned().collect();

        let transforms = spec
            .fields
            .iter()
            .filter(|(_, def)| def.field_type == FieldType::Text && !def.transform.is_empty())
            .filter_map(|(name, def)| {
                let chain: Vec<Transform> = def
                    .transform
                    .iter()
                    .filter_map(|t| match t.parse::<Transform>() {
                        Ok(transform) => Some(transform),
                        Err(e) => {
                            debug!(field = %name, "Skipping transform: {}", e);
                            None
                        }
                    })
                    .collect();
                (!chain.is_empty()).then(|| (name.clone(), chain))
            })
            .collect();

        Self {
            synonyms,
            whitelist,
            declared,
            transforms,
        }
    }

    /// Fields that declare synonyms, in declaration order.
    pub fn synonym_table(&self) -> &[SynonymEntry] {
        &self.synonyms
    }

    /// Safe field names, in declaration order.
    pub fn whitelist(&self) -> &[String] {
        &self.whitelist
    }

    /// Every declared field name, in declaration order.
    pub fn declared_fields(&self) -> &[String] {
        &self.declared
    }

    /// Recognized transform chain for `field`, if any.
    pub fn transforms_for(&self, field: &str) -> Option<&[Transform]> {
        self.transforms
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, chain)| chain.as_slice())
    }

    pub fn is_safe(&self, field: &str) -> bool {
        self.whitelist.iter().any(|w| w == field)
    }

    /// Normalizes a raw document against the schema.
    ///
    /// 1. Each present (truthy) synonym is copied onto its canonical field;
    ///    for a field with several present synonyms the last one wins.
    /// 2. Keys that are not declared fields are dropped. Output follows
    ///    declaration order.
    /// 3. Transform chains run over text fields holding text.
    ///
    /// `raw` is left untouched.
    pub fn force(&self, raw: &Document) -> Document {
        let mut resolved = raw.clone();
        for entry in &self.synonyms {
            for synonym in &entry.synonyms {
                if let Some(value) = resolved.get(synonym).filter(|v| v.is_truthy()).cloned() {
                    resolved.insert(entry.field.clone(), value);
                }
            }
        }

        let mut out: Document = self
            .declared
            .iter()
            .filter_map(|name| resolved.swap_remove(name).map(|v| (name.clone(), v)))
            .collect();

        for (name, chain) in &self.transforms {
            if let Some(Value::Text(text)) = out.get_mut(name) {
                *text = chain.iter().fold(std::mem::take(text), |acc, t| t.apply(&acc));
            }
        }

        out
    }

    /// Picks the whitelisted fields out of `fields`, in whitelist order.
    pub fn pick_safe(&self, fields: &Document) -> Document {
        self.whitelist
            .iter()
            .filter_map(|name| fields.get(name).map(|v| (name.clone(), v.clone())))
            .collect()
    }
}
