//! HR Vault Storage Library
//!
//! This crate provides the storage driver abstraction and its implementations:
//! local filesystem, and S3-compatible object stores (Wasabi, AWS S3).
//!
//! # Storage key format
//!
//! Keys are generated once at upload and stored with the document:
//!
//! `{tenant}/{owner_kind}/{owner_id}/{document_type_id}/{timestamp}-{random}-{filename}`
//!
//! where `{tenant}` is `org-{id}`, `company-{id}` or `global`. Keys must not
//! contain `..`, a leading `/` or backslashes. Key generation is centralized in
//! the `keys` module so every backend sees the same layout.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_driver, DriverOptions};
pub use hrvault_core::ProviderKind;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{
    ByteReader, ByteStream, Download, StorageDriver, StorageError, StorageResult, StoredRef,
};
