//! Entity source trait definitions

use crate::error::SourceResult;
use async_trait::async_trait;
use entigraph_core::{RawEntityRecord, RawRelationshipRecord};

/// Trait for catalog metadata sources
///
/// Failures are propagated unchanged; retries, if any, belong to the
/// implementation.
#[async_trait]
pub trait EntitySource: Send + Sync {
    /// Fetch every entity definition in the catalog
    async fn fetch_entity_definitions(&self) -> SourceResult<Vec<RawEntityRecord>>;

    /// Fetch every relationship definition in the catalog
    async fn fetch_relationship_definitions(&self) -> SourceResult<Vec<RawRelationshipRecord>>;

    /// Fetch the names of required attributes of one entity
    async fn fetch_required_attributes(&self, logical_name: &str) -> SourceResult<Vec<String>>;

    /// Health check
    async fn health_check(&self) -> SourceResult<bool> {
        Ok(true)
    }
}
