//! recmap: Map source rows to entity records
//!
//! Reads rows from JSON array or NDJSON files, maps each one with a column mapping
//! config, and writes one JSON record per line.
//!
//! Usage:
//!   # Map every file matching a pattern into a JSON Lines file
//!   recmap 'data/*.jsonl' --config mapping.json -o records.jsonl
//!
//!   # Page through mapped records on the console, starting at row 500
//!   recmap customers.json --config mapping.json -s 500

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use recmap::pipeline::{run, RunOptions};
use recmap::stream::{expand_inputs, RecordWriter, Reviewer};
use recmap::{ColumnMapper, MappingConfig};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "recmap")]
#[command(about = "Map source rows to entity records", long_about = None)]
struct Args {
    /// Input file or glob pattern
    #[arg(value_name = "INPUT")]
    input: String,

    /// Column mapping config (JSON)
    #[arg(long, short = 'c')]
    config: PathBuf,

    /// Output file for JSON Lines records
    /// If omitted, records are shown one at a time on the console
    #[arg(long, short = 'o')]
    output_file: Option<PathBuf>,

    /// Row number to start at
    #[arg(
        long,
        short = 's',
        default_value_t = 1,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    start_line: u64,

    /// Log progress every N rows (0 disables)
    #[arg(long, default_value_t = 10_000)]
    progress_interval: u64,

    /// Log and skip rows that fail to map instead of stopping
    #[arg(long)]
    skip_bad_rows: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr so records on stdout stay clean; RUST_LOG overrides the level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = MappingConfig::from_file(&args.config)?;
    let mapper = ColumnMapper::new(config);
    let files = expand_inputs(&args.input)?;

    // Ctrl+C stops before the next row so the output is flushed and the summary logged
    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupt);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("Failed to install Ctrl+C handler")?;

    let options = RunOptions {
        start_line: args.start_line,
        progress_interval: args.progress_interval,
        skip_bad_rows: args.skip_bad_rows,
        interrupt: Some(interrupt),
    };

    if let Some(output_file) = args.output_file {
        let file = File::create(&output_file)
            .with_context(|| format!("Failed to create output file: {}", output_file.display()))?;
        let mut writer = RecordWriter::new(BufWriter::new(file));
        run(&files, &mapper, &mut writer, &options)?;
    } else {
        let mut reviewer = Reviewer::console();
        run(&files, &mapper, &mut reviewer, &options)?;
    }

    Ok(())
}
