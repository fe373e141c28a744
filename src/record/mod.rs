//! Record assembly
//!
//! Builds one normalized entity record per input row: fixed identifying keys,
//! a list of features, and flattened payload attributes.

pub mod builder;
pub mod error;
pub mod hash;
pub mod types;

pub use builder::RecordBuilder;
pub use error::MappingError;
pub use hash::{canonical_json, compute_record_hash};
pub use types::{clean_attributes, is_absent, value_to_string, Feature, Record, Row};
