//! Data models for the document storage core
//!
//! Each sub-module covers one entity: tenants, document owners, storage
//! locations, backend configurations and documents.

mod document;
mod location;
mod owner;
mod storage_config;
mod tenant;

pub use document::*;
pub use location::*;
pub use owner::*;
pub use storage_config::*;
pub use tenant::*;
