//! Record accumulator
//!
//! A `RecordBuilder` is created for one input row, collects that row's features and
//! payload attributes, and renders the normalized record once the row is mapped.
//! Builders are never shared or reused across rows.

use crate::record::error::MappingError;
use crate::record::types::{
    clean_attributes, value_to_string, Feature, Record, DATA_SOURCE, FEATURES, PAYLOAD_SEPARATOR,
    RECORD_ID, RECORD_TYPE,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Accumulates the attributes of one record
#[derive(Debug, Default, Clone)]
pub struct RecordBuilder {
    data_source: String,
    record_id: String,
    record_type: String,

    /// Standalone and grouped features in the order they were first added
    features: Vec<Feature>,

    /// Group name to its position in `features`
    groups: HashMap<String, usize>,

    /// Payload attributes in first-contribution order, each with every value contributed
    payload: Vec<(String, Vec<String>)>,
    payload_index: HashMap<String, usize>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the data source tag. Empty values leave the previous tag in place.
    pub fn set_data_source(&mut self, value: impl AsRef<str>) {
        let value = value.as_ref();
        if !value.is_empty() {
            self.data_source = value.to_string();
        }
    }

    /// Set the record id, even to an empty string
    pub fn set_record_id(&mut self, value: impl Into<String>) {
        self.record_id = value.into();
    }

    /// Set the record type, usually "PERSON" or "ORGANIZATION". Empty values are ignored.
    pub fn set_record_type(&mut self, value: impl AsRef<str>) {
        let value = value.as_ref();
        if !value.is_empty() {
            self.record_type = value.to_string();
        }
    }

    /// Add a standalone feature, e.g. `[("SSN_NUMBER", ssn)]`.
    ///
    /// Nothing is added when every value is blank.
    pub fn add_feature<I, K, V>(&mut self, attributes: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let feature: Feature = clean_attributes(attributes).collect();
        if !feature.is_empty() {
            self.features.push(feature);
        }
    }

    /// Add attributes to the feature named `group`, creating it on first use.
    ///
    /// Repeated calls with the same group merge into one feature, e.g.
    /// `("name1", [("NAME_FIRST", first)])` then `("name1", [("NAME_LAST", last)])`.
    /// Setting an attribute the group already holds is an error and leaves the group
    /// unchanged.
    pub fn add_group_feature<I, K, V>(
        &mut self,
        group: &str,
        attributes: I,
    ) -> Result<(), MappingError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let index = match self.groups.get(group) {
            Some(&index) => index,
            None => {
                self.features.push(Feature::new());
                let index = self.features.len() - 1;
                self.groups.insert(group.to_string(), index);
                index
            }
        };

        let mut cleaned: Vec<(String, Value)> = Vec::new();
        for (attribute, value) in clean_attributes(attributes) {
            let seen = self.features[index].contains_key(&attribute)
                || cleaned.iter().any(|(existing, _)| *existing == attribute);
            if seen {
                return Err(MappingError::DuplicateAttribute {
                    group: group.to_string(),
                    attribute,
                });
            }
            cleaned.push((attribute, value));
        }

        self.features[index].extend(cleaned);
        Ok(())
    }

    /// Add payload attributes. Values for the same attribute accumulate.
    pub fn add_payload<I, K, V>(&mut self, attributes: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (attribute, value) in clean_attributes(attributes) {
            let text = value_to_string(&value);
            match self.payload_index.get(&attribute) {
                Some(&index) => self.payload[index].1.push(text),
                None => {
                    self.payload_index.insert(attribute.clone(), self.payload.len());
                    self.payload.push((attribute, vec![text]));
                }
            }
        }
    }

    /// Render the record.
    ///
    /// Keys come out as DATA_SOURCE, RECORD_ID, RECORD_TYPE, FEATURES, then payload
    /// attributes. A payload key matching one of the fixed keys replaces its value.
    pub fn render(&self) -> Record {
        let mut record = Map::new();
        record.insert(DATA_SOURCE.to_string(), Value::String(self.data_source.clone()));
        record.insert(RECORD_ID.to_string(), Value::String(self.record_id.clone()));
        record.insert(RECORD_TYPE.to_string(), Value::String(self.record_type.clone()));

        let features = self
            .features
            .iter()
            .filter(|feature| !feature.is_empty())
            .cloned()
            .map(Value::Object)
            .collect();
        record.insert(FEATURES.to_string(), Value::Array(features));

        for (attribute, values) in &self.payload {
            let value = match values.as_slice() {
                [single] => single.clone(),
                many => many.join(PAYLOAD_SEPARATOR),
            };
            record.insert(attribute.clone(), Value::String(value));
        }

        record
    }
}
