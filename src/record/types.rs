use serde_json::{Map, Value};

/// One input row: column name to raw value, in source column order
pub type Row = Map<String, Value>;

/// A rendered entity record, ready to be written as one JSON line
pub type Record = Map<String, Value>;

/// A single feature: attribute name to value
pub type Feature = Map<String, Value>;

pub const DATA_SOURCE: &str = "DATA_SOURCE";
pub const RECORD_ID: &str = "RECORD_ID";
pub const RECORD_TYPE: &str = "RECORD_TYPE";
pub const FEATURES: &str = "FEATURES";

/// Separator used when a payload attribute received more than one value
pub const PAYLOAD_SEPARATOR: &str = " | ";

/// Whether a value counts as missing: `null`, or a string that is empty once trimmed.
///
/// Zero and `false` are real values and are kept.
pub fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Render a value as plain text: strings as-is, everything else as JSON text
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Trim string values and drop absent ones, keeping the input order
pub fn clean_attributes<I, K, V>(attributes: I) -> impl Iterator<Item = (String, Value)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    attributes.into_iter().filter_map(|(key, value)| {
        let value = match value.into() {
            Value::String(s) => Value::String(s.trim().to_string()),
            other => other,
        };
        if is_absent(&value) {
            None
        } else {
            Some((key.into(), value))
        }
    })
}
