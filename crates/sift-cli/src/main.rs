//! Sift CLI - run telemetry readings through a rule configuration.

use anyhow::{Context, Result};
use clap::Parser;
use sift_core::Reading;
use sift_rule_engine::FilterEngine;
use std::fs;
use std::io::{self, Read as _, Write as _};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(about = "Run telemetry readings through a sift rule configuration", long_about = None)]
struct Cli {
    /// Rule configuration file (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Readings file (JSON object or array of objects); stdin when omitted
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file; stdout when omitted
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Service name reported in asset lineage
    #[arg(long, default_value = "sift")]
    service: String,

    /// Pretty-print the output JSON
    #[arg(long)]
    pretty: bool,

    /// Pass readings through without applying any rules
    #[arg(long)]
    disabled: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    let engine = FilterEngine::new(cli.service.clone(), &config)
        .with_context(|| format!("invalid rule configuration in {}", cli.config.display()))?;
    engine.set_enabled(!cli.disabled);

    let text = match &cli.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let readings = parse_batch(&text)?;
    let batch_size = readings.len();

    let out = engine.ingest(readings);
    info!("Processed {batch_size} readings into {}", out.len());
    let json: Vec<_> = out.iter().map(Reading::to_json).collect();
    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    };

    match &cli.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Parse a batch of readings: a JSON array, or a single reading object.
fn parse_batch(text: &str) -> Result<Vec<Reading>> {
    let document: serde_json::Value =
        serde_json::from_str(text).context("input is not valid JSON")?;
    match document {
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| Reading::from_json(item).map_err(Into::into))
            .collect(),
        single => Ok(vec![Reading::from_json(&single)?]),
    }
}
