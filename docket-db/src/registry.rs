use crate::{Collection, DbConfig, DbResult};
use docket_model::FieldSpec;
use docket_storage::Driver;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Maps collection names to their definitions.
///
/// Definitions are made through `&mut self`, so they belong to an
/// initialization phase; afterwards the registry can be shared read-only.
pub struct Registry {
    driver: Arc<dyn Driver>,
    config: DbConfig,
    collections: HashMap<String, Collection>,
}

impl Registry {
    pub fn new(driver: Arc<dyn Driver>, config: DbConfig) -> Self {
        Self {
            driver,
            config,
            collections: HashMap::new(),
        }
    }

    /// Defines (or redefines) the collection `name`.
    ///
    /// The spec is copied, so later changes to the caller's value have no
    /// effect. A handle is opened for the spec's `db`, or the configured
    /// default database. Any earlier definition under `name` is replaced
    /// and can no longer be looked up.
    pub fn define(&mut self, name: &str, spec: &FieldSpec) -> DbResult<Collection> {
        let spec = spec.clone();
        let db_name = spec
            .db
            .clone()
            .unwrap_or_else(|| self.config.db_name.clone());
        let handle = self.driver.open(&db_name)?;
        let collection = Collection::new(name, spec, handle, self.config.id_generator())?;

        let replaced = self
            .collections
            .insert(name.to_string(), collection.clone())
            .is_some();
        info!(collection = %name, db = %db_name, replaced, "Defined collection");

        Ok(collection)
    }

    /// Parses a JSON field spec and defines `name` with it.
    pub fn define_json(&mut self, name: &str, json: &str) -> DbResult<Collection> {
        let spec = FieldSpec::from_json(json)?;
        self.define(name, &spec)
    }

    /// Looks up the current definition of `name`.
    pub fn schema(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    /// Names of all defined collections, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.collections.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("collections", &self.names())
            .finish()
    }
}
