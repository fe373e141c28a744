use crate::mapping::config::{ColumnRef, MappingConfig, RecordIdSource};
use crate::mapping::RecordMapper;
use crate::record::{
    compute_record_hash, is_absent, value_to_string, MappingError, Record, RecordBuilder, Row,
};
use serde_json::Value;

/// Maps rows column-by-column according to a `MappingConfig`
#[derive(Debug, Clone)]
pub struct ColumnMapper {
    config: MappingConfig,
}

impl ColumnMapper {
    pub fn new(config: MappingConfig) -> Self {
        ColumnMapper { config }
    }

    fn record_id(&self, row: &Row) -> String {
        match &self.config.record_id {
            RecordIdSource::Column(column) => row
                .get(column)
                .filter(|value| !is_absent(value))
                .map(|value| value_to_string(value).trim().to_string())
                .unwrap_or_default(),
            RecordIdSource::Hash(columns) => compute_record_hash(row, columns.as_slice()),
        }
    }

    fn is_missing_required(&self, row: &Row) -> bool {
        self.config
            .required_columns
            .iter()
            .any(|column| row.get(column).map_or(true, is_absent))
    }
}

fn column_values<'a>(
    row: &'a Row,
    refs: &'a [ColumnRef],
) -> impl Iterator<Item = (&'a str, Value)> + 'a {
    refs.iter().map(move |column_ref| {
        let value = row.get(&column_ref.column).cloned().unwrap_or(Value::Null);
        (column_ref.attribute.as_str(), value)
    })
}

impl RecordMapper for ColumnMapper {
    fn map_record(&self, row: &Row) -> Result<Vec<Record>, MappingError> {
        if self.is_missing_required(row) {
            return Ok(Vec::new());
        }

        let mut builder = RecordBuilder::new();
        builder.set_data_source(&self.config.data_source);
        builder.set_record_id(self.record_id(row));
        builder.set_record_type(&self.config.record_type);

        for feature in &self.config.features {
            let attributes = column_values(row, &feature.attributes);
            match &feature.group {
                Some(group) => builder.add_group_feature(group, attributes)?,
                None => builder.add_feature(attributes),
            }
        }

        builder.add_payload(column_values(row, &self.config.payload));

        Ok(vec![builder.render()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        serde_json::from_value(value).unwrap()
    }

    fn mapper(config: Value) -> ColumnMapper {
        ColumnMapper::new(serde_json::from_value(config).unwrap())
    }

    #[test]
    fn test_person_mapping() {
        let mapper = mapper(json!({
            "data_source": "CUSTOMERS",
            "record_type": "PERSON",
            "record_id": {"column": "id"},
            "features": [
                {"group": "name1", "attributes": [{"attribute": "NAME_FIRST", "column": "first"}]},
                {"group": "name1", "attributes": [{"attribute": "NAME_LAST", "column": "last"}]},
                {"attributes": [{"attribute": "SSN_NUMBER", "column": "ssn"}]},
                {"attributes": [{"attribute": "DATE_OF_BIRTH", "column": "dob"}]}
            ],
            "payload": [
                {"attribute": "job_title", "column": "title"},
                {"attribute": "job_title", "column": "title2"}
            ]
        }));

        let records = mapper
            .map_record(&row(json!({
                "id": 1001,
                "first": "Jane ",
                "last": "Doe",
                "ssn": "123-45-6789",
                "dob": "",
                "title": "Engineer",
                "title2": "Manager"
            })))
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(
            Value::Object(records[0].clone()),
            json!({
                "DATA_SOURCE": "CUSTOMERS",
                "RECORD_ID": "1001",
                "RECORD_TYPE": "PERSON",
                "FEATURES": [
                    {"NAME_FIRST": "Jane", "NAME_LAST": "Doe"},
                    {"SSN_NUMBER": "123-45-6789"}
                ],
                "job_title": "Engineer | Manager"
            })
        );
    }

    #[test]
    fn test_hashed_record_id() {
        let mapper = mapper(json!({"record_id": {"hash": ["name", "phone"]}}));

        let first = mapper.map_record(&row(json!({"name": "ACME  corp", "phone": "555"}))).unwrap();
        let second = mapper.map_record(&row(json!({"phone": "555", "name": "acme corp"}))).unwrap();

        let id = first[0]["RECORD_ID"].as_str().unwrap();
        assert_eq!(id.len(), 32);
        assert_eq!(first[0]["RECORD_ID"], second[0]["RECORD_ID"]);
    }

    #[test]
    fn test_required_columns_filter_rows() {
        let mapper = mapper(json!({"required_columns": ["id"], "record_id": {"column": "id"}}));

        assert!(mapper.map_record(&row(json!({"id": " "}))).unwrap().is_empty());
        assert!(mapper.map_record(&row(json!({"name": "x"}))).unwrap().is_empty());
        assert_eq!(mapper.map_record(&row(json!({"id": "9"}))).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_group_attribute_surfaces() {
        // Built directly to bypass config validation
        let config = MappingConfig {
            features: vec![
                crate::mapping::FeatureSpec {
                    group: Some("addr1".to_string()),
                    attributes: vec![ColumnRef {
                        attribute: "ADDR_CITY".to_string(),
                        column: "city".to_string(),
                    }],
                },
                crate::mapping::FeatureSpec {
                    group: Some("addr1".to_string()),
                    attributes: vec![ColumnRef {
                        attribute: "ADDR_CITY".to_string(),
                        column: "town".to_string(),
                    }],
                },
            ],
            ..MappingConfig::default()
        };

        let err = ColumnMapper::new(config)
            .map_record(&row(json!({"city": "Austin", "town": "Round Rock"})))
            .unwrap_err();
        assert!(matches!(err, MappingError::DuplicateAttribute { .. }));
    }
}
