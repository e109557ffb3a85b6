//! HR Vault business services
//!
//! Tenant-aware routing of documents to storage backends:
//!
//! - [`LocationRegistry`]: which location is active for a tenant
//! - [`ConfigService`]: validated backend configuration per location
//! - [`DriverFactory`]: turns a configuration snapshot into a storage driver
//! - [`DocumentService`]: upload, access, download, delete and listing

pub mod config;
pub mod document;
pub mod driver;
pub mod location;

pub use config::ConfigService;
pub use document::{
    DocumentDetails, DocumentDownload, DocumentPage, DocumentService, UploadFile, UploadOutcome,
    UploadRequest,
};
pub use driver::{BackendDriverFactory, DriverFactory};
pub use location::LocationRegistry;
