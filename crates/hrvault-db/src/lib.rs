//! HR Vault database layer
//!
//! Repository traits for storage locations, backend configurations and
//! document metadata, with PostgreSQL implementations and in-memory
//! implementations for tests.

pub mod db;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

pub use db::{
    DocumentRepository, DocumentStore, LocationRepository, LocationStore,
    StorageConfigRepository, StorageConfigStore,
};
