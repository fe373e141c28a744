//! Batch driver: files in, records out
//!
//! Rows are numbered from 1 across all input files, so `start_line` can resume a run
//! that spans several files.

use crate::mapping::RecordMapper;
use crate::stream::{read_rows_from_path, RecordSink, SinkControl};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Options for one mapping run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// First row number to map; earlier rows are read and counted but not mapped
    pub start_line: u64,

    /// Log progress every this many rows (0 disables)
    pub progress_interval: u64,

    /// Log and skip rows whose mapping fails instead of stopping the run
    pub skip_bad_rows: bool,

    /// Set from outside (e.g. a Ctrl+C handler) to stop before the next row
    pub interrupt: Option<Arc<AtomicBool>>,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            start_line: 1,
            progress_interval: 10_000,
            skip_bad_rows: false,
            interrupt: None,
        }
    }
}

impl RunOptions {
    fn interrupted(&self) -> bool {
        self.interrupt
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

/// Counters for a finished run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    pub rows_read: u64,
    pub records_written: u64,
    pub rows_skipped: u64,
    /// The run was stopped by the sink or an interrupt before the input was exhausted
    pub aborted: bool,
    pub elapsed: Duration,
}

impl RunStats {
    pub fn summary(&self) -> String {
        let status = if self.aborted { "aborted after" } else { "completed in" };
        format!(
            "{} rows processed, {} rows written, {} {:.1} minutes",
            self.rows_read,
            self.records_written,
            status,
            self.elapsed.as_secs_f64() / 60.0
        )
    }
}

/// Map every row of `files` and hand the records to `sink`
pub fn run<P, M, S>(
    files: &[P],
    mapper: &M,
    sink: &mut S,
    options: &RunOptions,
) -> Result<RunStats>
where
    P: AsRef<Path>,
    M: RecordMapper + ?Sized,
    S: RecordSink + ?Sized,
{
    let started = Instant::now();
    let mut stats = RunStats::default();

    'files: for (file_num, path) in files.iter().enumerate() {
        let path = path.as_ref();
        info!("reading file {} of {}: {}", file_num + 1, files.len(), path.display());

        let rows = read_rows_from_path(path)?;
        debug!(rows = rows.len(), "loaded {}", path.display());

        for row in rows {
            if options.interrupted() {
                warn!("USER INTERRUPT! Shutting down ...");
                stats.aborted = true;
                break 'files;
            }

            stats.rows_read += 1;
            let row_number = stats.rows_read;
            if row_number < options.start_line {
                continue;
            }

            match mapper.map_record(&row) {
                Ok(records) => {
                    for record in records {
                        match sink.accept(row_number, &record, &row)? {
                            SinkControl::Continue => stats.records_written += 1,
                            SinkControl::Stop => {
                                stats.aborted = true;
                                break 'files;
                            }
                        }
                    }
                }
                Err(err) if options.skip_bad_rows => {
                    warn!(row = row_number, "skipping row: {}", err);
                    stats.rows_skipped += 1;
                }
                Err(err) => {
                    return Err(err)
                        .with_context(|| format!("Failed to map row {}", row_number));
                }
            }

            if options.progress_interval > 0 && row_number % options.progress_interval == 0 {
                info!(
                    "{} rows processed, {} rows written",
                    stats.rows_read, stats.records_written
                );
            }
        }
    }

    sink.finish()?;
    stats.elapsed = started.elapsed();
    info!("{}", stats.summary());
    Ok(stats)
}
