//! aps-normalize: Flatten raw APS responses into records
//!
//! Usage:
//!   # Normalize a saved response, one record per line
//!   aps-normalize response.json
//!
//!   # Read from stdin, keep the raw JSON:API shape
//!   cat folder.json | aps-normalize --no-simplify
//!
//!   # Process NDJSON, one raw payload per line
//!   aps-normalize --ndjson responses.jsonl
//!
//!   # Print a node description
//!   aps-normalize --describe apsOss

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{anyhow, Context, Result};
use aps_nodes::nodes::{data_management, model_derivative, oss, NodeDescription};
use aps_nodes::{normalize_json, NormalizeOptions, Normalized, Normalizer, RecordWriter};
use clap::Parser;
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "aps-normalize")]
#[command(about = "Flatten raw APS responses into records", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Process newline-delimited JSON (one raw payload per line)
    #[arg(long)]
    ndjson: bool,

    /// Keep JSON:API entities as they are instead of flattening them
    #[arg(long)]
    no_simplify: bool,

    /// Split a bare top-level array into separate records
    #[arg(long)]
    split_into_items: bool,

    /// One record per line even for a single result
    #[arg(long)]
    compact: bool,

    /// Print the description of a node (apsOss, apsDataManagement, apsModelDerivative) and exit
    #[arg(long, value_name = "NODE")]
    describe: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("APS_NODES_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    if let Some(name) = &args.describe {
        let description = find_description(name)?;
        println!("{}", serde_json::to_string_pretty(description)?);
        return Ok(());
    }

    let options = NormalizeOptions::new(args.split_into_items, !args.no_simplify);

    let reader = if let Some(file_path) = &args.input {
        Box::new(BufReader::new(
            File::open(file_path).with_context(|| format!("Failed to open {}", file_path))?,
        )) as Box<dyn Read>
    } else {
        Box::new(std::io::stdin()) as Box<dyn Read>
    };

    let stdout = std::io::stdout();
    let mut writer = RecordWriter::new(stdout.lock());

    if args.ndjson {
        let count = normalize_json(BufReader::new(reader), &mut writer, options)?;
        tracing::info!(records = count, "normalized stream");
    } else {
        let value = read_document(reader)?;
        let normalized = Normalizer::new(options).normalize(value);
        match normalized {
            Normalized::Single(record) if !args.compact => {
                let mut out = writer.into_inner();
                writeln!(out, "{}", serde_json::to_string_pretty(&record)?)?;
                out.flush()?;
                return Ok(());
            }
            normalized => writer.write_normalized(normalized)?,
        }
    }

    writer.flush()?;
    Ok(())
}

fn find_description(name: &str) -> Result<&'static NodeDescription> {
    [
        &oss::DESCRIPTION,
        &data_management::DESCRIPTION,
        &model_derivative::DESCRIPTION,
    ]
    .into_iter()
    .find(|description| description.name == name)
    .ok_or_else(|| anyhow!("unknown node {name}"))
}

/// Read one JSON document, using SIMD-accelerated parsing when possible
fn read_document(reader: Box<dyn Read>) -> Result<Value> {
    let mut content = Vec::new();
    let mut buf_reader = BufReader::new(reader);
    buf_reader
        .read_to_end(&mut content)
        .context("Failed to read input")?;

    if content.iter().all(u8::is_ascii_whitespace) {
        // An empty body is a valid (empty) response
        return Ok(Value::Null);
    }

    // simd-json parses in place, keep a copy for the fallback
    let mut scratch = content.clone();
    match simd_json::serde::from_slice::<Value>(&mut scratch) {
        Ok(value) => Ok(value),
        Err(_) => serde_json::from_slice(&content).context("Failed to parse JSON"),
    }
}
