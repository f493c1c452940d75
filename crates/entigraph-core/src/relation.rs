//! Relation (edge) types and normalization

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One-to-many relationship as delivered by the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct OneToManyRecord {
    pub schema_name: String,

    /// The "one" side
    pub referenced_entity: String,

    /// The "many" side
    pub referencing_entity: String,

    pub referenced_attribute: Option<String>,

    pub referencing_attribute: Option<String>,

    /// Cascade configuration, passed through untouched
    pub cascade_configuration: serde_json::Value,
}

/// Many-to-many relationship as delivered by the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct ManyToManyRecord {
    pub schema_name: String,
    pub entity1_logical_name: String,
    pub entity2_logical_name: String,
    pub intersect_entity_name: Option<String>,
    pub entity1_intersect_attribute: Option<String>,
    pub entity2_intersect_attribute: Option<String>,
}

/// A raw relationship definition, discriminated by its metadata type
#[derive(Debug, Clone, PartialEq)]
pub enum RawRelationshipRecord {
    OneToMany(OneToManyRecord),
    ManyToMany(ManyToManyRecord),
    /// Any other metadata type; kept so the normalizer can account for it
    Unrecognized {
        schema_name: String,
        odata_type: String,
    },
}

impl RawRelationshipRecord {
    /// Convenience constructor for a one-to-many record without attributes
    pub fn one_to_many(
        schema_name: impl Into<String>,
        referenced_entity: impl Into<String>,
        referencing_entity: impl Into<String>,
    ) -> Self {
        Self::OneToMany(OneToManyRecord {
            schema_name: schema_name.into(),
            referenced_entity: referenced_entity.into(),
            referencing_entity: referencing_entity.into(),
            referenced_attribute: None,
            referencing_attribute: None,
            cascade_configuration: serde_json::Value::Null,
        })
    }

    /// Convenience constructor for a many-to-many record without attributes
    pub fn many_to_many(
        schema_name: impl Into<String>,
        entity1: impl Into<String>,
        entity2: impl Into<String>,
    ) -> Self {
        Self::ManyToMany(ManyToManyRecord {
            schema_name: schema_name.into(),
            entity1_logical_name: entity1.into(),
            entity2_logical_name: entity2.into(),
            intersect_entity_name: None,
            entity1_intersect_attribute: None,
            entity2_intersect_attribute: None,
        })
    }

    pub fn schema_name(&self) -> &str {
        match self {
            Self::OneToMany(r) => &r.schema_name,
            Self::ManyToMany(r) => &r.schema_name,
            Self::Unrecognized { schema_name, .. } => schema_name,
        }
    }
}

/// Type-specific part of an edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EdgeKind {
    #[serde(rename_all = "camelCase")]
    OneToMany {
        source_attribute: Option<String>,
        target_attribute: Option<String>,
        #[serde(default)]
        relationship_behavior: serde_json::Value,
    },
    #[serde(rename_all = "camelCase")]
    ManyToMany {
        intersect_entity: Option<String>,
        entity1_attribute: Option<String>,
        entity2_attribute: Option<String>,
    },
}

/// A normalized relationship between two entities (an edge)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Edge id, always the schema name
    pub id: String,

    pub schema_name: String,

    /// Source entity logical name
    pub source_entity: String,

    /// Target entity logical name
    pub target_entity: String,

    #[serde(flatten)]
    pub kind: EdgeKind,
}

impl Edge {
    /// Whether both endpoints are members of `ids`
    pub fn connects(&self, ids: &HashSet<&str>) -> bool {
        ids.contains(self.source_entity.as_str()) && ids.contains(self.target_entity.as_str())
    }

    pub fn is_one_to_many(&self) -> bool {
        matches!(self.kind, EdgeKind::OneToMany { .. })
    }

    /// Wire name of the edge type
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            EdgeKind::OneToMany { .. } => "OneToMany",
            EdgeKind::ManyToMany { .. } => "ManyToMany",
        }
    }
}

impl TryFrom<RawRelationshipRecord> for Edge {
    type Error = Error;

    fn try_from(record: RawRelationshipRecord) -> Result<Self> {
        match record {
            // The "one" side points at the "many" side
            RawRelationshipRecord::OneToMany(r) => Ok(Edge {
                id: r.schema_name.clone(),
                schema_name: r.schema_name,
                source_entity: r.referenced_entity,
                target_entity: r.referencing_entity,
                kind: EdgeKind::OneToMany {
                    source_attribute: r.referenced_attribute,
                    target_attribute: r.referencing_attribute,
                    relationship_behavior: r.cascade_configuration,
                },
            }),
            RawRelationshipRecord::ManyToMany(r) => Ok(Edge {
                id: r.schema_name.clone(),
                schema_name: r.schema_name,
                source_entity: r.entity1_logical_name,
                target_entity: r.entity2_logical_name,
                kind: EdgeKind::ManyToMany {
                    intersect_entity: r.intersect_entity_name,
                    entity1_attribute: r.entity1_intersect_attribute,
                    entity2_attribute: r.entity2_intersect_attribute,
                },
            }),
            RawRelationshipRecord::Unrecognized {
                schema_name,
                odata_type,
            } => Err(Error::UnrecognizedRelationshipType {
                schema_name,
                odata_type,
            }),
        }
    }
}

/// Normalize a single relationship record into an edge
pub fn normalize(record: RawRelationshipRecord) -> Result<Edge> {
    Edge::try_from(record)
}

/// Normalize a batch, returning the edges and the number of dropped records
pub fn normalize_all(records: impl IntoIterator<Item = RawRelationshipRecord>) -> (Vec<Edge>, usize) {
    let mut edges = Vec::new();
    let mut dropped = 0;

    for record in records {
        match normalize(record) {
            Ok(edge) => edges.push(edge),
            Err(e) => {
                tracing::debug!("Dropping relationship: {}", e);
                dropped += 1;
            }
        }
    }

    (edges, dropped)
}
