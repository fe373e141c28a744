//! Interactive record review on the console
//!
//! Shows each rendered record, pretty-printed, and waits for the user before moving on.
//! The raw source row can be shown on request.

use crate::record::{Record, Row};
use crate::stream::{RecordSink, SinkControl};
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::io::{BufRead, StdinLock, Stdout, Write};

const NEXT_PROMPT: &str = "Press Enter for next, 'r' to show raw source (q to abort): ";
const SOURCE_PROMPT: &str = "\nPress Enter for next record (q to abort) ...";

/// A sink that pages through records interactively
pub struct Reviewer<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl Reviewer<StdinLock<'static>, Stdout> {
    /// Review on the process console
    pub fn console() -> Self {
        Reviewer::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Reviewer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Reviewer { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Show a prompt and read the answer. `None` means the input was closed.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("Failed to read response")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_lowercase()))
    }
}

fn to_pretty<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer).context("Failed to serialize record")?;
    String::from_utf8(buf).context("Serialized record is not UTF-8")
}

impl<R: BufRead, W: Write> RecordSink for Reviewer<R, W> {
    fn accept(&mut self, row_number: u64, record: &Record, row: &Row) -> Result<SinkControl> {
        writeln!(self.output, "--- Record {} ---", row_number)?;
        writeln!(self.output, "{}", to_pretty(record)?)?;

        let answer = match self.prompt(NEXT_PROMPT)? {
            Some(answer) => answer,
            None => return Ok(SinkControl::Stop),
        };

        match answer.as_str() {
            "q" => Ok(SinkControl::Stop),
            "r" => {
                writeln!(self.output, "\nSource:")?;
                writeln!(self.output, "{}", to_pretty(row)?)?;
                match self.prompt(SOURCE_PROMPT)?.as_deref() {
                    None | Some("q") => Ok(SinkControl::Stop),
                    Some(_) => Ok(SinkControl::Continue),
                }
            }
            _ => Ok(SinkControl::Continue),
        }
    }

    fn finish(&mut self) -> Result<()> {
        self.output.flush().context("Failed to flush console")
    }
}
