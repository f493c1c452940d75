//! Snapshot file source for offline use
//!
//! The file holds the catalog payloads as the Web API returns them:
//!
//! ```json
//! {
//!   "EntityDefinitions": { "value": [ ... ] },
//!   "RelationshipDefinitions": [ ... ],
//!   "RequiredAttributes": { "account": ["name"] }
//! }
//! ```

use crate::error::{SourceError, SourceResult};
use crate::traits::EntitySource;
use crate::wire;
use async_trait::async_trait;
use entigraph_core::{RawEntityRecord, RawRelationshipRecord};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::Mutex;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct SnapshotFile {
    entity_definitions: serde_json::Value,
    relationship_definitions: serde_json::Value,
    required_attributes: HashMap<String, Vec<String>>,
}

/// File identity used to tell whether the snapshot changed on disk
type Stamp = (Option<SystemTime>, u64);

/// Entity source backed by a JSON snapshot on disk
///
/// Entity and relationship fetches re-read the file. Required attributes
/// are parsed once and reused until the file's mtime or length changes.
pub struct SnapshotFileSource {
    path: PathBuf,
    required: Mutex<Option<(Stamp, Arc<HashMap<String, Vec<String>>>)>>,
    loads: AtomicUsize,
}

impl SnapshotFileSource {
    pub fn open(path: impl AsRef<Path>) -> SourceResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(SourceError::Config(format!(
                "Snapshot file not found: {}",
                path.display()
            )));
        }
        Ok(Self {
            path,
            required: Mutex::new(None),
            loads: AtomicUsize::new(0),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of times the file has been parsed
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    async fn load(&self) -> SourceResult<SnapshotFile> {
        tracing::debug!("Reading snapshot from {:?}", self.path);
        let content = tokio::fs::read_to_string(&self.path).await?;
        self.loads.fetch_add(1, Ordering::Relaxed);
        Ok(serde_json::from_str(&content)?)
    }

    async fn stamp(&self) -> SourceResult<Stamp> {
        let metadata = tokio::fs::metadata(&self.path).await?;
        Ok((metadata.modified().ok(), metadata.len()))
    }

    async fn required_attributes(&self) -> SourceResult<Arc<HashMap<String, Vec<String>>>> {
        // Held across the load so concurrent lookups share one parse
        let mut cached = self.required.lock().await;
        let stamp = self.stamp().await?;

        if let Some((seen, required)) = cached.as_ref() {
            if *seen == stamp {
                return Ok(Arc::clone(required));
            }
        }

        let required = Arc::new(self.load().await?.required_attributes);
        *cached = Some((stamp, Arc::clone(&required)));
        Ok(required)
    }
}

#[async_trait]
impl EntitySource for SnapshotFileSource {
    async fn fetch_entity_definitions(&self) -> SourceResult<Vec<RawEntityRecord>> {
        let snapshot = self.load().await?;
        let values = wire::collection(snapshot.entity_definitions)?;
        Ok(wire::decode_entities(&values))
    }

    async fn fetch_relationship_definitions(&self) -> SourceResult<Vec<RawRelationshipRecord>> {
        let snapshot = self.load().await?;
        let values = wire::collection(snapshot.relationship_definitions)?;
        Ok(wire::decode_relationships(&values))
    }

    async fn fetch_required_attributes(&self, logical_name: &str) -> SourceResult<Vec<String>> {
        let required = self.required_attributes().await?;
        Ok(required.get(logical_name).cloned().unwrap_or_default())
    }

    async fn health_check(&self) -> SourceResult<bool> {
        Ok(self.path.is_file())
    }
}
