//! HTTP server
//!
//! Serves the graph API under `/api` plus a banner at `/` and `/health`.

use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use entigraph_source::EntitySource;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::service::GraphService;

/// Maximum request body size (1MB)
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Origins of the local front-end dev servers
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://localhost:5174",
    "http://localhost:5175",
    "http://localhost:3000",
];

/// Listener and CORS settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|o| o.to_string())
                .collect(),
        }
    }
}

impl ServerConfig {
    /// Resolve the listen address; `host` may be an IP literal or a hostname
    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| anyhow::anyhow!("Invalid address {}:{}: {}", self.host, self.port, e))?
            .next()
            .ok_or_else(|| {
                anyhow::anyhow!("Address {}:{} did not resolve", self.host, self.port)
            })
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Create the API router
pub fn create_router<S: EntitySource + 'static>(
    service: Arc<GraphService<S>>,
    allowed_origins: &[String],
) -> Router {
    let api = Router::new()
        .route("/entities", get(handlers::list_entities::<S>))
        .route("/relationships", get(handlers::list_relationships::<S>))
        .route("/graph", get(handlers::graph::<S>));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
}

/// Run the HTTP server until the process is stopped
pub async fn run_server<S: EntitySource + 'static>(
    service: Arc<GraphService<S>>,
    config: &ServerConfig,
) -> anyhow::Result<()> {
    let addr = config.addr()?;
    let router = create_router(service, &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Entigraph API listening on http://{}", addr);
    tracing::info!("  Graph endpoint: http://{}/api/graph", addr);
    tracing::info!("  Health check: http://{}/health", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
