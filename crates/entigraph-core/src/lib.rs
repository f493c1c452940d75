//! Entigraph Core - Graph assembly engine for schema-metadata catalogs
//!
//! This crate turns raw entity and relationship definitions into a
//! filtered, ranked node/edge graph. It performs no I/O; fetching the
//! catalog is the job of an entity source.

pub mod catalog;
pub mod classify;
pub mod entity;
pub mod error;
pub mod filter;
pub mod graph;
pub mod hierarchy;
pub mod relation;

pub use catalog::CatalogLists;
pub use classify::Classifier;
pub use entity::{Node, RawEntityRecord};
pub use error::{Error, Result};
pub use filter::{positive_limit, split_prefixes, FilterPolicy};
pub use graph::{AssemblyStats, EntityGraph, GraphAssembler, Snapshot};
pub use relation::{
    normalize, normalize_all, Edge, EdgeKind, ManyToManyRecord, OneToManyRecord,
    RawRelationshipRecord,
};
