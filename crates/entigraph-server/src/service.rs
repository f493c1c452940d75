//! Graph service
//!
//! Fetches a catalog snapshot from the entity source for every call and
//! hands it to the assembler.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use entigraph_core::{
    hierarchy, normalize_all, Edge, EntityGraph, FilterPolicy, GraphAssembler, Node,
    RawEntityRecord, Result, Snapshot,
};
use entigraph_source::EntitySource;
use futures::future::join_all;

/// Service behind the HTTP API and the CLI
pub struct GraphService<S: EntitySource> {
    source: Arc<S>,
    assembler: GraphAssembler,
    curated: bool,
}

impl<S: EntitySource + 'static> GraphService<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            assembler: GraphAssembler::default(),
            curated: true,
        }
    }

    pub fn with_assembler(mut self, assembler: GraphAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    /// Build graphs from the curated entity set (the default) or from the
    /// whole catalog
    pub fn with_curated(mut self, curated: bool) -> Self {
        self.curated = curated;
        self
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn is_curated(&self) -> bool {
        self.curated
    }

    /// Required fields of each named entity, fetched concurrently
    ///
    /// A failed lookup is logged and leaves the entity without required
    /// fields.
    async fn required_fields<'a>(
        &self,
        entities: impl Iterator<Item = &'a RawEntityRecord>,
    ) -> HashMap<String, Vec<String>> {
        let mut seen = HashSet::new();
        let names: Vec<&str> = entities
            .map(|e| e.logical_name.as_str())
            .filter(|name| seen.insert(*name))
            .collect();

        let fetches = names.into_iter().map(|name| async move {
            match self.source.fetch_required_attributes(name).await {
                Ok(fields) => (name.to_string(), fields),
                Err(e) => {
                    tracing::warn!("Failed to fetch required fields for {}: {}", name, e);
                    (name.to_string(), Vec::new())
                }
            }
        });

        join_all(fetches)
            .await
            .into_iter()
            .filter(|(_, fields)| !fields.is_empty())
            .collect()
    }

    /// Curated entity listing
    pub async fn entities(&self) -> Result<Vec<Node>> {
        let entities = self.source.fetch_entity_definitions().await?;
        let mut snapshot = Snapshot::new().with_entities(entities);
        let removed = self.assembler.curate(&mut snapshot);

        snapshot.required_fields = self
            .required_fields(
                snapshot
                    .entities
                    .iter()
                    .filter(|e| hierarchy::needs_required_fields(hierarchy::level(&e.logical_name))),
            )
            .await;

        let nodes = self.assembler.curated_nodes(snapshot);
        tracing::info!("Listed {} entities ({} excluded)", nodes.len(), removed);
        Ok(nodes)
    }

    /// Every recognized relationship in the catalog
    pub async fn relationships(&self) -> Result<Vec<Edge>> {
        let relationships = self.source.fetch_relationship_definitions().await?;
        let (edges, dropped) = normalize_all(relationships);
        if dropped > 0 {
            tracing::warn!("Dropped {} unrecognized relationships", dropped);
        }
        tracing::info!("Listed {} relationships", edges.len());
        Ok(edges)
    }

    /// Assemble the graph for `policy`, keeping at most `limit` nodes
    pub async fn graph(&self, policy: &FilterPolicy, limit: Option<usize>) -> Result<EntityGraph> {
        let (entities, relationships) = futures::try_join!(
            self.source.fetch_entity_definitions(),
            self.source.fetch_relationship_definitions(),
        )?;

        let mut snapshot = Snapshot::new()
            .with_entities(entities)
            .with_relationships(relationships);
        if self.curated {
            self.assembler.curate(&mut snapshot);
        }

        snapshot.required_fields = self
            .required_fields(
                snapshot
                    .entities
                    .iter()
                    .filter(|e| self.assembler.wants_required_fields(e, policy)),
            )
            .await;

        let graph = self.assembler.assemble(snapshot, policy, limit);
        let stats = &graph.stats;
        tracing::info!(
            "Graph {}: {} nodes, {} edges ({} entities seen, {} relationships dropped, {} nodes truncated)",
            policy,
            graph.node_count(),
            graph.edge_count(),
            stats.entities_seen,
            stats.unrecognized_relationships,
            stats.truncated_nodes
        );
        Ok(graph)
    }

    pub async fn health_check(&self) -> Result<bool> {
        Ok(self.source.health_check().await?)
    }
}
