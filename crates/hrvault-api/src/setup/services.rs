//! Repository and service wiring.

use crate::state::AppState;
use anyhow::{Context, Result};
use hrvault_core::{Config, EncryptionService};
use hrvault_db::{DocumentRepository, LocationRepository, StorageConfigRepository};
use hrvault_services::{
    BackendDriverFactory, ConfigService, DocumentService, LocationRegistry,
};
use hrvault_storage::DriverOptions;
use sqlx::PgPool;
use std::sync::Arc;

pub async fn initialize_services(config: &Config, pool: PgPool) -> Result<Arc<AppState>> {
    let encryption = EncryptionService::from_base64_key(config.encryption_key())
        .context("Failed to initialize secret encryption")?;

    let locations = Arc::new(LocationRepository::new(pool.clone()));
    let config_store = Arc::new(StorageConfigRepository::new(pool.clone(), encryption));
    let document_store = Arc::new(DocumentRepository::new(pool.clone()));

    let registry = LocationRegistry::new(locations, config_store.clone(), document_store.clone());
    let configs = ConfigService::new(registry.clone(), config_store);
    let drivers = Arc::new(BackendDriverFactory::new(DriverOptions::from_config(config)));
    let documents = DocumentService::new(
        registry.clone(),
        configs.clone(),
        document_store,
        drivers,
    );

    let default_location = registry
        .ensure_default_location(config.default_local_storage_path())
        .await
        .context("Failed to provision the default storage location")?;
    tracing::info!(
        location_id = %default_location.id,
        root_path = %config.default_local_storage_path(),
        "Default storage location ready"
    );

    Ok(Arc::new(AppState {
        documents,
        locations: registry,
        configs,
        db: Some(pool),
        max_upload_size_bytes: config.max_upload_size_bytes(),
    }))
}
