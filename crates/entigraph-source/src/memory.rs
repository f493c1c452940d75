//! In-memory entity source
//!
//! Useful for testing and for embedding a pre-fetched catalog.

use crate::error::{SourceError, SourceResult};
use crate::traits::EntitySource;
use async_trait::async_trait;
use entigraph_core::{RawEntityRecord, RawRelationshipRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

fn lock_error(e: impl std::fmt::Display) -> SourceError {
    SourceError::Config(format!("Lock error: {}", e))
}

/// In-memory entity source
pub struct MemorySource {
    entities: RwLock<Vec<RawEntityRecord>>,
    relationships: RwLock<Vec<RawRelationshipRecord>>,
    required_attributes: RwLock<HashMap<String, Vec<String>>>,
    required_fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(Vec::new()),
            relationships: RwLock::new(Vec::new()),
            required_attributes: RwLock::new(HashMap::new()),
            required_fetches: AtomicUsize::new(0),
        }
    }

    pub fn with_entities(self, entities: Vec<RawEntityRecord>) -> Self {
        if let Ok(mut guard) = self.entities.write() {
            *guard = entities;
        }
        self
    }

    pub fn with_relationships(self, relationships: Vec<RawRelationshipRecord>) -> Self {
        if let Ok(mut guard) = self.relationships.write() {
            *guard = relationships;
        }
        self
    }

    pub fn with_required_attributes(self, name: impl Into<String>, fields: Vec<String>) -> Self {
        if let Ok(mut guard) = self.required_attributes.write() {
            guard.insert(name.into(), fields);
        }
        self
    }

    pub fn add_relationship(&self, relationship: RawRelationshipRecord) -> SourceResult<()> {
        self.relationships
            .write()
            .map_err(lock_error)?
            .push(relationship);
        Ok(())
    }

    /// Number of required-attribute lookups served so far
    pub fn required_fetches(&self) -> usize {
        self.required_fetches.load(Ordering::Relaxed)
    }
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntitySource for MemorySource {
    async fn fetch_entity_definitions(&self) -> SourceResult<Vec<RawEntityRecord>> {
        Ok(self.entities.read().map_err(lock_error)?.clone())
    }

    async fn fetch_relationship_definitions(&self) -> SourceResult<Vec<RawRelationshipRecord>> {
        Ok(self.relationships.read().map_err(lock_error)?.clone())
    }

    async fn fetch_required_attributes(&self, logical_name: &str) -> SourceResult<Vec<String>> {
        self.required_fetches.fetch_add(1, Ordering::Relaxed);
        let required = self.required_attributes.read().map_err(lock_error)?;
        Ok(required.get(logical_name).cloned().unwrap_or_default())
    }
}
