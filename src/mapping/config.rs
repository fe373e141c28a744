use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Column-driven mapping, usually loaded from a JSON file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingConfig {
    /// Data source tag written to every record
    #[serde(default)]
    pub data_source: String,

    /// Record type, e.g. "PERSON" or "ORGANIZATION"
    #[serde(default)]
    pub record_type: String,

    /// Where the record id comes from
    #[serde(default)]
    pub record_id: RecordIdSource,

    /// Rows missing any of these columns produce no record
    #[serde(default)]
    pub required_columns: Vec<String>,

    /// Features in output order
    #[serde(default)]
    pub features: Vec<FeatureSpec>,

    /// Payload attributes
    #[serde(default)]
    pub payload: Vec<ColumnRef>,
}

/// Source of the record id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordIdSource {
    /// Copy the value of one column
    Column(String),
    /// Hash the listed columns, or the whole row when the list is empty
    Hash(Vec<String>),
}

impl Default for RecordIdSource {
    fn default() -> Self {
        RecordIdSource::Hash(Vec::new())
    }
}

/// One feature: standalone when `group` is absent, otherwise merged by group name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureSpec {
    #[serde(default)]
    pub group: Option<String>,
    pub attributes: Vec<ColumnRef>,
}

/// Maps an input column onto an output attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnRef {
    pub attribute: String,
    pub column: String,
}

impl MappingConfig {
    /// Load and validate a mapping from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read mapping config: {}", path.display()))?;
        let config: MappingConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse mapping config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject mappings that could never produce a valid record
    pub fn validate(&self) -> Result<()> {
        if let RecordIdSource::Column(column) = &self.record_id {
            if column.is_empty() {
                bail!("record_id column must not be empty");
            }
        }

        let mut group_attributes: HashMap<&str, HashSet<&str>> = HashMap::new();
        for (i, feature) in self.features.iter().enumerate() {
            if feature.attributes.is_empty() {
                bail!("feature {} has no attributes", i + 1);
            }
            let Some(group) = feature.group.as_deref() else {
                continue;
            };
            let seen = group_attributes.entry(group).or_default();
            for column_ref in &feature.attributes {
                if !seen.insert(column_ref.attribute.as_str()) {
                    bail!(
                        "attribute '{}' mapped twice for feature '{}'",
                        column_ref.attribute,
                        group
                    );
                }
            }
        }

        Ok(())
    }
}
