//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use entigraph_core::{positive_limit, Edge, EntityGraph, FilterPolicy, Node};
use entigraph_source::EntitySource;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::service::GraphService;

const SERVICE_NAME: &str = "Entigraph Entity Graph API";
const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Query parameters of `GET /api/graph`
#[derive(Debug, Default, Deserialize)]
pub struct GraphQuery {
    pub filter_mode: Option<String>,
    pub prefixes: Option<String>,
    pub limit: Option<i64>,
}

/// Body of `GET /api/graph`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphResponse {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub node_count: usize,
    pub edge_count: usize,
}

impl From<EntityGraph> for GraphResponse {
    fn from(graph: EntityGraph) -> Self {
        Self {
            node_count: graph.nodes.len(),
            edge_count: graph.edges.len(),
            nodes: graph.nodes,
            edges: graph.edges,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EntitiesResponse {
    pub entities: Vec<Node>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct RelationshipsResponse {
    pub relationships: Vec<Edge>,
    pub count: usize,
}

pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": SERVICE_NAME,
        "version": SERVICE_VERSION
    }))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

pub async fn list_entities<S: EntitySource + 'static>(
    State(service): State<Arc<GraphService<S>>>,
) -> Result<Json<EntitiesResponse>, ApiError> {
    tracing::info!("Fetching all entities");
    let entities = service.entities().await?;

    Ok(Json(EntitiesResponse {
        count: entities.len(),
        entities,
    }))
}

pub async fn list_relationships<S: EntitySource + 'static>(
    State(service): State<Arc<GraphService<S>>>,
) -> Result<Json<RelationshipsResponse>, ApiError> {
    tracing::info!("Fetching all relationships");
    let relationships = service.relationships().await?;

    Ok(Json(RelationshipsResponse {
        count: relationships.len(),
        relationships,
    }))
}

pub async fn graph<S: EntitySource + 'static>(
    State(service): State<Arc<GraphService<S>>>,
    query: Result<Query<GraphQuery>, QueryRejection>,
) -> Result<Json<GraphResponse>, ApiError> {
    let Query(query) = query?;
    tracing::info!(
        "Fetching graph data (filter_mode={:?}, prefixes={:?}, limit={:?})",
        query.filter_mode,
        query.prefixes,
        query.limit
    );

    // Reject an unknown mode before touching the source
    let policy = FilterPolicy::parse(query.filter_mode.as_deref(), query.prefixes.as_deref())?;
    let graph = service.graph(&policy, positive_limit(query.limit)).await?;

    Ok(Json(graph.into()))
}
