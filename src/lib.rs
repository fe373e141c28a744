//! # recmap - Entity Record Mapping Toolkit
//!
//! Turns source rows into normalized entity records: a data source tag, a record id,
//! a record type, a list of features, and flattened payload attributes. Each record is
//! written as one line of JSON.
//!
//! ## Modules
//!
//! - **record**: the per-row record accumulator and the record hash key
//! - **mapping**: the `RecordMapper` trait and the config-driven `ColumnMapper`
//! - **stream**: row input and record sinks (JSON Lines writer, console reviewer)
//! - **pipeline**: the batch driver tying them together
//!
//! ## Quick Start
//!
//! ```rust
//! use recmap::record::RecordBuilder;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut builder = RecordBuilder::new();
//! builder.set_data_source("CUSTOMERS");
//! builder.set_record_id("1001");
//! builder.set_record_type("PERSON");
//! builder.add_group_feature("name1", [("NAME_FIRST", "Jane")])?;
//! builder.add_group_feature("name1", [("NAME_LAST", "Doe")])?;
//! builder.add_feature([("SSN_NUMBER", "123-45-6789")]);
//! builder.add_payload([("job_title", "Engineer")]);
//!
//! let record = builder.render();
//! // {"DATA_SOURCE":"CUSTOMERS","RECORD_ID":"1001","RECORD_TYPE":"PERSON",
//! //  "FEATURES":[{"NAME_FIRST":"Jane","NAME_LAST":"Doe"},{"SSN_NUMBER":"123-45-6789"}],
//! //  "job_title":"Engineer"}
//! assert_eq!(record["FEATURES"].as_array().map(Vec::len), Some(2));
//! # Ok(())
//! # }
//! ```
//!
//! ### Record keys from attribute values
//!
//! ```rust
//! use recmap::record::{compute_record_hash, Row};
//! use serde_json::json;
//!
//! let row: Row =
//!     serde_json::from_value(json!({"name": "Acme  Corp", "phone": "555-1212"})).unwrap();
//! let key = compute_record_hash(&row, &["phone", "name"]);
//! assert_eq!(key.len(), 32);
//! ```

use anyhow::Result;
use std::io::{BufRead, Write};

pub mod mapping;
pub mod pipeline;
pub mod record;
pub mod stream;

// Re-export commonly used types for convenience
pub use mapping::{ColumnMapper, MappingConfig, RecordMapper};
pub use pipeline::{run, RunOptions, RunStats};
pub use record::{compute_record_hash, MappingError, Record, RecordBuilder, Row};
pub use stream::{RecordSink, RecordWriter, Reviewer, SinkControl};

/// Map a stream of rows (JSON array or NDJSON) straight to JSON Lines output
pub fn map_json<R: BufRead, W: Write, M: RecordMapper + ?Sized>(
    reader: R,
    writer: &mut RecordWriter<W>,
    mapper: &M,
) -> Result<()> {
    for row in stream::read_rows(reader)? {
        for record in mapper.map_record(&row)? {
            writer.write_record(&record)?;
        }
    }
    writer.flush()
}
