#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
#[cfg(any(not(feature = "storage-local"), not(feature = "storage-s3")))]
use crate::StorageError;
use crate::{StorageDriver, StorageResult};
use hrvault_core::constants::{DEFAULT_OBJECT_STORE_TIMEOUT_SECS, DEFAULT_PRESIGNED_URL_EXPIRY_SECS};
use hrvault_core::models::ProviderConfig;
use hrvault_core::Config;
use std::sync::Arc;
use std::time::Duration;

/// Process-wide settings applied to every driver.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Used for local locations whose config has no `base_url`.
    pub local_base_url: String,
    pub timeout: Duration,
    pub presign_expiry: Duration,
}

impl DriverOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            local_base_url: config.local_storage_base_url().to_string(),
            timeout: config.object_store_timeout(),
            presign_expiry: config.presigned_url_expiry(),
        }
    }
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            local_base_url: "http://localhost:4000/files".to_string(),
            timeout: Duration::from_secs(DEFAULT_OBJECT_STORE_TIMEOUT_SECS),
            presign_expiry: Duration::from_secs(DEFAULT_PRESIGNED_URL_EXPIRY_SECS),
        }
    }
}

/// Create a storage driver for one location's backend configuration
pub async fn create_driver(
    config: &ProviderConfig,
    options: &DriverOptions,
) -> StorageResult<Arc<dyn StorageDriver>> {
    match config {
        #[cfg(feature = "storage-local")]
        ProviderConfig::Local(local) => {
            let base_url = local
                .base_url
                .clone()
                .unwrap_or_else(|| options.local_base_url.clone());
            let storage = LocalStorage::new(local.root_path.clone(), base_url).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        ProviderConfig::Local(_) => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-s3")]
        ProviderConfig::Wasabi(cfg) | ProviderConfig::Aws(cfg) => {
            let storage = S3Storage::new(
                config.kind(),
                cfg,
                options.timeout,
                options.presign_expiry,
            )?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        ProviderConfig::Wasabi(_) | ProviderConfig::Aws(_) => Err(StorageError::ConfigError(
            "Object storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),
    }
}
