//! Docket command-line tool.
//!
//! Usage:
//!   docket describe --schema spec.json
//!   docket normalize --schema spec.json --input record.json --pretty
//!   docket save --schema spec.json --assign-ids < record.json

use anyhow::{Context, Result};
use clap::Parser;
use docket_cli::{Cli, Command, RecordArgs};
use docket_db::DbConfig;
use std::io::Read;
use std::path::Path;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let config = match &cli.config {
        Some(path) => DbConfig::load_from(path),
        None => DbConfig::default(),
    };
    info!(db = %config.db_name, "Docket starting");

    let output = match &cli.command {
        Command::Describe { schema } => docket_cli::describe(&read_file(schema)?)?,
        Command::Normalize(args) => {
            let (spec, input) = read_record_args(args)?;
            docket_cli::normalize(&spec, &input, &args.name, &args.stringify_options(), config)?
        }
        Command::Save { record, assign_ids } => {
            let (spec, input) = read_record_args(record)?;
            docket_cli::save(
                &spec,
                &input,
                &record.name,
                &record.stringify_options(),
                config,
                *assign_ids,
            )
            .await?
        }
    };

    println!("{}", output.trim_end());
    Ok(())
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_record_args(args: &RecordArgs) -> Result<(String, String)> {
    let spec = read_file(&args.schema)?;
    let input = match &args.input {
        Some(path) => read_file(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read record from stdin")?;
            buf
        }
    };
    Ok((spec, input))
}
