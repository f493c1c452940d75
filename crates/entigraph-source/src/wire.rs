//! Decoding of OData metadata payloads into raw catalog records

use crate::error::{SourceError, SourceResult};
use entigraph_core::{ManyToManyRecord, OneToManyRecord, RawEntityRecord, RawRelationshipRecord};
use serde_json::Value;

/// Columns requested for entity definitions
pub const ENTITY_SELECT: &str = "LogicalName,SchemaName,DisplayName,PrimaryIdAttribute,PrimaryNameAttribute,EntitySetName,IsCustomEntity,IsActivity,Description";

/// Columns requested for attribute definitions
pub const ATTRIBUTE_SELECT: &str = "LogicalName,RequiredLevel";

const ONE_TO_MANY: &str = "OneToManyRelationshipMetadata";
const MANY_TO_MANY: &str = "ManyToManyRelationshipMetadata";

/// Required levels that make an attribute mandatory
const REQUIRED_LEVELS: &[&str] = &["ApplicationRequired", "SystemRequired"];

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn bool_field(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn required_string(value: &Value, key: &str, what: &str) -> SourceResult<String> {
    string_field(value, key)
        .ok_or_else(|| SourceError::MalformedRecord(format!("{} without {}", what, key)))
}

/// First localized label of a `Label` object; the first label wins
pub fn first_label(label: Option<&Value>) -> Option<String> {
    label?
        .get("LocalizedLabels")?
        .as_array()?
        .first()?
        .get("Label")?
        .as_str()
        .map(str::to_string)
}

/// Unwrap a collection that may be a bare array or an OData `{ "value": [...] }` envelope
pub fn collection(value: Value) -> SourceResult<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("value") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(SourceError::MalformedRecord(
                "collection without a 'value' array".to_string(),
            )),
        },
        Value::Null => Ok(Vec::new()),
        _ => Err(SourceError::MalformedRecord(
            "collection is neither an array nor an object".to_string(),
        )),
    }
}

/// Decode one entity definition
pub fn decode_entity(value: &Value) -> SourceResult<RawEntityRecord> {
    Ok(RawEntityRecord {
        logical_name: required_string(value, "LogicalName", "entity")?,
        display_label: first_label(value.get("DisplayName")),
        schema_name: string_field(value, "SchemaName"),
        entity_set_name: string_field(value, "EntitySetName"),
        primary_id_attribute: string_field(value, "PrimaryIdAttribute"),
        primary_name_attribute: string_field(value, "PrimaryNameAttribute"),
        is_custom: bool_field(value, "IsCustomEntity"),
        is_activity: bool_field(value, "IsActivity"),
        description: first_label(value.get("Description")),
    })
}

/// Decode entity definitions, skipping records without a logical name
pub fn decode_entities(values: &[Value]) -> Vec<RawEntityRecord> {
    values
        .iter()
        .filter_map(|v| match decode_entity(v) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping entity definition: {}", e);
                None
            }
        })
        .collect()
}

fn relationship_type(value: &Value) -> String {
    string_field(value, "@odata.type")
        .or_else(|| string_field(value, "RelationshipType"))
        .unwrap_or_default()
}

/// Decode one relationship definition
///
/// Unknown metadata types decode to [`RawRelationshipRecord::Unrecognized`]
/// so the normalizer can account for them.
pub fn decode_relationship(value: &Value) -> SourceResult<RawRelationshipRecord> {
    let schema_name = required_string(value, "SchemaName", "relationship")?;
    let odata_type = relationship_type(value);

    if odata_type.contains(ONE_TO_MANY) || odata_type == "OneToManyRelationship" {
        Ok(RawRelationshipRecord::OneToMany(OneToManyRecord {
            referenced_entity: required_string(value, "ReferencedEntity", &schema_name)?,
            referencing_entity: required_string(value, "ReferencingEntity", &schema_name)?,
            referenced_attribute: string_field(value, "ReferencedAttribute"),
            referencing_attribute: string_field(value, "ReferencingAttribute"),
            cascade_configuration: value
                .get("CascadeConfiguration")
                .cloned()
                .unwrap_or_else(|| Value::Object(Default::default())),
            schema_name,
        }))
    } else if odata_type.contains(MANY_TO_MANY) || odata_type == "ManyToManyRelationship" {
        Ok(RawRelationshipRecord::ManyToMany(ManyToManyRecord {
            entity1_logical_name: required_string(value, "Entity1LogicalName", &schema_name)?,
            entity2_logical_name: required_string(value, "Entity2LogicalName", &schema_name)?,
            intersect_entity_name: string_field(value, "IntersectEntityName"),
            entity1_intersect_attribute: string_field(value, "Entity1IntersectAttribute"),
            entity2_intersect_attribute: string_field(value, "Entity2IntersectAttribute"),
            schema_name,
        }))
    } else {
        Ok(RawRelationshipRecord::Unrecognized {
            schema_name,
            odata_type,
        })
    }
}

/// Decode relationship definitions, skipping malformed records
pub fn decode_relationships(values: &[Value]) -> Vec<RawRelationshipRecord> {
    values
        .iter()
        .filter_map(|v| match decode_relationship(v) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping relationship definition: {}", e);
                None
            }
        })
        .collect()
}

/// Logical names of the attributes whose required level makes them mandatory
pub fn decode_required_attributes(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter(|attr| {
            attr.get("RequiredLevel")
                .and_then(|level| level.get("Value"))
                .and_then(Value::as_str)
                .map(|level| REQUIRED_LEVELS.contains(&level))
                .unwrap_or(false)
        })
        .filter_map(|attr| string_field(attr, "LogicalName"))
        .collect()
}
