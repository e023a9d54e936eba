//! Engine configuration, read from a TOML file.
//!
//! ```toml
//! db_name = "app"
//! id_digits = 24
//! ```

use crate::{DbError, DbResult};
use docket_types::IdGenerator;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbConfig {
    /// Database opened for collections whose spec names none.
    #[serde(default = "default_db_name")]
    pub db_name: String,
    /// Length of locally generated identifiers, in hex digits.
    #[serde(default = "default_id_digits")]
    pub id_digits: usize,
}

fn default_db_name() -> String {
    "docket".to_string()
}

fn default_id_digits() -> usize {
    IdGenerator::DEFAULT_DIGITS
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            db_name: default_db_name(),
            id_digits: default_id_digits(),
        }
    }
}

impl DbConfig {
    /// Config with a custom default database name.
    pub fn with_db_name(db_name: impl Into<String>) -> Self {
        Self {
            db_name: db_name.into(),
            ..Self::default()
        }
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> DbResult<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads config from `path`.
    /// Falls back to defaults with a warning if the file is missing or invalid.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No config file found at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path)
            .map_err(DbError::from)
            .and_then(|contents| Self::from_toml_str(&contents))
        {
            Ok(config) => {
                info!(db = %config.db_name, "Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                warn!("Failed to load config {:?}: {}. Falling back to defaults.", path, e);
                Self::default()
            }
        }
    }

    /// Identifier generator matching `id_digits`.
    pub fn id_generator(&self) -> IdGenerator {
        IdGenerator::with_digits(self.id_digits)
    }

    fn validate(&self) -> DbResult<()> {
        if self.db_name.trim().is_empty() {
            return Err(DbError::InvalidConfig("db_name must not be empty".into()));
        }
        if self.id_digits == 0 {
            return Err(DbError::InvalidConfig("id_digits must be at least 1".into()));
        }
        Ok(())
    }
}
