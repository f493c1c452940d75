//! Entigraph Source - Entity metadata sources
//!
//! This crate provides the sources the graph engine reads catalog
//! metadata from: a live Dataverse environment, a JSON snapshot on disk,
//! or an in-memory catalog.

#![allow(clippy::result_large_err)]

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;
pub mod wire;

#[cfg(feature = "dataverse")]
pub mod dataverse;

pub use error::{SourceError, SourceResult};
pub use file::SnapshotFileSource;
pub use memory::MemorySource;
pub use traits::EntitySource;

#[cfg(feature = "dataverse")]
pub use dataverse::{DataverseConfig, DataverseSource};
