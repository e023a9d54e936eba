//! Command implementations for the `docket` binary.
//!
//! Each command takes already-read text and returns the text to print,
//! so the binary only deals with files, logging and exit codes.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use docket_db::{DbConfig, Registry, Saved};
use docket_model::FieldSpec;
use docket_storage::MemoryDriver;
use docket_types::ejson::StringifyOptions;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "docket")]
#[command(about = "Inspect field specs and normalize records")]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the synonym table, safe whitelist and transforms of a spec
    Describe {
        /// Field spec JSON file
        #[arg(short, long)]
        schema: PathBuf,
    },
    /// Normalize a record and print its safe serialization
    Normalize(RecordArgs),
    /// Normalize a record, save it to an in-memory backend and print the result
    Save {
        #[command(flatten)]
        record: RecordArgs,

        /// Let the backend assign identifiers
        #[arg(long)]
        assign_ids: bool,
    },
}

#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Field spec JSON file
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Record file (extended JSON); reads stdin when omitted
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Collection name
    #[arg(short, long, default_value = "records")]
    pub name: String,

    /// Pretty-print output
    #[arg(long)]
    pub pretty: bool,

    /// Sort keys in output
    #[arg(long)]
    pub canonical: bool,
}

impl RecordArgs {
    pub fn stringify_options(&self) -> StringifyOptions {
        StringifyOptions {
            indent: self.pretty,
            canonical: self.canonical,
        }
    }
}

/// Renders the derived schema artifacts of a spec.
pub fn describe(spec_json: &str) -> Result<String> {
    let spec = FieldSpec::from_json(spec_json).context("Failed to parse field spec")?;
    let descriptor = docket_model::SchemaDescriptor::derive(&spec);

    let mut out = String::new();
    writeln!(
        out,
        "fields: {} (db: {})",
        spec.fields.len(),
        spec.db.as_deref().unwrap_or("default")
    )?;

    writeln!(out, "synonyms:")?;
    for entry in descriptor.synonym_table() {
        writeln!(out, "  {} <- {}", entry.field, entry.synonyms.join(", "))?;
    }

    writeln!(out, "safe: {}", descriptor.whitelist().join(", "))?;

    writeln!(out, "transforms:")?;
    for name in descriptor.declared_fields() {
        if let Some(chain) = descriptor.transforms_for(name) {
            let names: Vec<&str> = chain.iter().map(|t| t.name()).collect();
            writeln!(out, "  {} -> {}", name, names.join(", "))?;
        }
    }
    Ok(out)
}

/// Normalizes `input` against the spec and returns its safe serialization.
pub fn normalize(
    spec_json: &str,
    input: &str,
    name: &str,
    options: &StringifyOptions,
    config: DbConfig,
) -> Result<String> {
    let mut registry = Registry::new(Arc::new(MemoryDriver::new()), config);
    let collection = registry
        .define_json(name, spec_json)
        .context("Failed to define collection")?;

    let record = collection.create(input);
    debug!(collection = %name, id = ?record.id(), "Normalized record");
    Ok(record.serialize(options))
}

/// Normalizes `input`, saves it, and returns a status line followed by the
/// saved record's safe serialization.
pub async fn save(
    spec_json: &str,
    input: &str,
    name: &str,
    options: &StringifyOptions,
    config: DbConfig,
    assign_ids: bool,
) -> Result<String> {
    let driver = if assign_ids {
        MemoryDriver::with_assigned_ids()
    } else {
        MemoryDriver::new()
    };
    let mut registry = Registry::new(Arc::new(driver), config);
    let collection = registry
        .define_json(name, spec_json)
        .context("Failed to define collection")?;

    let mut record = collection.create(input);
    let status = match record.save().await.context("Failed to save record")? {
        Saved::Created { id: Some(id) } => format!("created {id}"),
        Saved::Created { id: None } => "created (no id)".to_string(),
        Saved::Updated(_) => "updated".to_string(),
    };
    Ok(format!("{status}\n{}", record.serialize(options)))
}
