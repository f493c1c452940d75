//! Entity (node) types

use serde::{Deserialize, Serialize};

/// An entity definition as delivered by the metadata catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEntityRecord {
    /// Logical name (unique key)
    pub logical_name: String,

    /// First localized display label, if any
    #[serde(default)]
    pub display_label: Option<String>,

    #[serde(default)]
    pub schema_name: Option<String>,

    #[serde(default)]
    pub entity_set_name: Option<String>,

    #[serde(default)]
    pub primary_id_attribute: Option<String>,

    #[serde(default)]
    pub primary_name_attribute: Option<String>,

    #[serde(default)]
    pub is_custom: bool,

    #[serde(default)]
    pub is_activity: bool,

    /// First localized description, if any
    #[serde(default)]
    pub description: Option<String>,
}

impl RawEntityRecord {
    /// Create a record with only a logical name set
    pub fn new(logical_name: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            ..Default::default()
        }
    }

    /// Mark the record as a custom entity
    pub fn custom(mut self) -> Self {
        self.is_custom = true;
        self
    }

    /// Mark the record as an activity entity
    pub fn activity(mut self) -> Self {
        self.is_activity = true;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.display_label = Some(label.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_schema_name(mut self, schema_name: impl Into<String>) -> Self {
        self.schema_name = Some(schema_name.into());
        self
    }
}

/// An entity in the assembled graph (a node)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Node id, always the logical name
    pub id: String,

    /// Display label, falls back to the logical name
    pub label: String,

    pub logical_name: String,

    pub schema_name: Option<String>,

    pub entity_set_name: Option<String>,

    pub primary_id_attribute: Option<String>,

    pub primary_name_attribute: Option<String>,

    #[serde(rename = "isCustomEntity")]
    pub is_custom: bool,

    pub is_activity: bool,

    /// Description text, empty when the catalog has none
    pub description: String,

    /// Layout rank, see [`crate::hierarchy`]
    pub hierarchy_level: u8,

    /// Required attribute names; only populated for levels 1 to 3
    #[serde(default)]
    pub required_fields: Vec<String>,
}

impl Node {
    /// Build a node from a raw record, applying the catalog defaults
    pub fn from_record(record: RawEntityRecord, hierarchy_level: u8) -> Self {
        let label = record
            .display_label
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| record.logical_name.clone());

        Self {
            id: record.logical_name.clone(),
            label,
            logical_name: record.logical_name,
            schema_name: record.schema_name,
            entity_set_name: record.entity_set_name,
            primary_id_attribute: record.primary_id_attribute,
            primary_name_attribute: record.primary_name_attribute,
            is_custom: record.is_custom,
            is_activity: record.is_activity,
            description: record.description.unwrap_or_default(),
            hierarchy_level,
            required_fields: Vec::new(),
        }
    }

    pub fn with_required_fields(mut self, fields: Vec<String>) -> Self {
        self.required_fields = fields;
        self
    }
}
