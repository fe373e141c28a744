//! Row input and record output
//!
//! Rows are read from JSON array or newline-delimited JSON files. Rendered records go to
//! a `RecordSink`: a JSON Lines writer for batch runs, or the interactive reviewer.

pub mod reader;
pub mod review;
pub mod writer;

pub use reader::{expand_inputs, read_rows, read_rows_from_path};
pub use review::Reviewer;
pub use writer::RecordWriter;

use crate::record::{Record, Row};
use anyhow::Result;

/// What the pipeline should do after a sink accepted a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkControl {
    Continue,
    Stop,
}

/// Destination for rendered records
pub trait RecordSink {
    /// Take one record produced from input row number `row_number` (1-based)
    fn accept(&mut self, row_number: u64, record: &Record, row: &Row) -> Result<SinkControl>;

    /// Called once after the last record
    fn finish(&mut self) -> Result<()>;
}
