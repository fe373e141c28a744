//! Row-to-record mapping
//!
//! A `RecordMapper` turns one input row into zero or more rendered records. Mappers can
//! be written by hand as closures, or driven by a `MappingConfig` through `ColumnMapper`.

pub mod column_mapper;
pub mod config;

pub use column_mapper::ColumnMapper;
pub use config::{ColumnRef, FeatureSpec, MappingConfig, RecordIdSource};

use crate::record::{MappingError, Record, Row};

/// Maps one input row to the records it produces.
///
/// Returning no records filters the row out.
pub trait RecordMapper {
    fn map_record(&self, row: &Row) -> Result<Vec<Record>, MappingError>;
}

impl<F> RecordMapper for F
where
    F: Fn(&Row) -> Result<Vec<Record>, MappingError>,
{
    fn map_record(&self, row: &Row) -> Result<Vec<Record>, MappingError> {
        self(row)
    }
}
