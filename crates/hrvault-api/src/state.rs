//! Shared application state handed to every handler.

use hrvault_services::{ConfigService, DocumentService, LocationRegistry};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub documents: DocumentService,
    pub locations: LocationRegistry,
    pub configs: ConfigService,
    /// Absent when running against in-memory stores.
    pub db: Option<PgPool>,
    pub max_upload_size_bytes: usize,
}
