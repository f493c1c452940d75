//! Entigraph Server - HTTP API for the entity graph
//!
//! Exposes the graph service over HTTP for the front-end renderer.

pub mod error;
pub mod handlers;
pub mod server;
pub mod service;

pub use error::ApiError;
pub use server::{create_router, run_server, ServerConfig};
pub use service::GraphService;
