use crate::record::{Record, Row};
use crate::stream::{RecordSink, SinkControl};
use anyhow::{Context, Result};
use std::io::Write;

/// Writes each record as one compact JSON line
pub struct RecordWriter<W: Write> {
    writer: W,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(writer: W) -> Self {
        RecordWriter { writer }
    }

    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        let json = serde_json::to_string(record).context("Failed to serialize record")?;
        writeln!(self.writer, "{}", json).context("Failed to write record")
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush writer")
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for RecordWriter<W> {
    fn accept(&mut self, _row_number: u64, record: &Record, _row: &Row) -> Result<SinkControl> {
        self.write_record(record)?;
        Ok(SinkControl::Continue)
    }

    fn finish(&mut self) -> Result<()> {
        self.flush()
    }
}
