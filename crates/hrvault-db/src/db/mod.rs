//! Database repositories for data access layer
//!
//! Each repository owns one table and is exposed through a trait so services
//! can run against PostgreSQL in production and in-memory stores in tests.

pub mod config;
pub mod document;
pub mod location;

pub use config::{StorageConfigRepository, StorageConfigStore};
pub use document::{DocumentRepository, DocumentStore};
pub use location::{LocationRepository, LocationStore};

use hrvault_core::AppError;

/// Map constraint violations that signal a still-referenced location.
pub(crate) fn map_reference_violation(err: sqlx::Error, context: &str) -> AppError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_foreign_key_violation() {
            return AppError::LocationInUse(context.to_string());
        }
    }
    AppError::Database(err)
}
