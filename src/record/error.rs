use thiserror::Error;

/// Errors raised while assembling a record from a row
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// The same attribute was assigned twice to one feature group within a record
    #[error("attribute '{attribute}' already set for feature '{group}'")]
    DuplicateAttribute { group: String, attribute: String },
}
