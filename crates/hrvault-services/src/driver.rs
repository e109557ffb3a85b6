use async_trait::async_trait;
use hrvault_core::models::ProviderConfig;
use hrvault_core::AppError;
use hrvault_storage::{create_driver, DriverOptions, StorageDriver};
use std::sync::Arc;

/// Builds the driver for one backend configuration.
///
/// Called once per operation with the configuration read at its start, so a
/// config edit never reaches an operation already in flight.
#[async_trait]
pub trait DriverFactory: Send + Sync {
    async fn driver_for(&self, config: &ProviderConfig) -> Result<Arc<dyn StorageDriver>, AppError>;
}

/// Factory backed by the real local and S3-compatible drivers.
#[derive(Debug, Clone, Default)]
pub struct BackendDriverFactory {
    options: DriverOptions,
}

impl BackendDriverFactory {
    pub fn new(options: DriverOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl DriverFactory for BackendDriverFactory {
    async fn driver_for(&self, config: &ProviderConfig) -> Result<Arc<dyn StorageDriver>, AppError> {
        create_driver(config, &self.options).await.map_err(|e| {
            tracing::error!(error = %e, provider = %config.kind(), "Failed to build storage driver");
            AppError::from(e)
        })
    }
}
