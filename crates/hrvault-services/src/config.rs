use hrvault_core::models::{ConfigFields, StorageConfig, StorageConfigResponse, TenantContext};
use hrvault_core::validation::validate_provider_config;
use hrvault_core::{AppError, ProviderKind};
use hrvault_db::StorageConfigStore;
use std::sync::Arc;
use uuid::Uuid;

use crate::location::LocationRegistry;

/// Backend configuration per storage location.
#[derive(Clone)]
pub struct ConfigService {
    registry: LocationRegistry,
    configs: Arc<dyn StorageConfigStore>,
}

impl ConfigService {
    pub fn new(registry: LocationRegistry, configs: Arc<dyn StorageConfigStore>) -> Self {
        Self { registry, configs }
    }

    /// Validate and store the configuration of one location.
    ///
    /// `kind` must equal the location's provider. Credentials are accepted as
    /// given; nothing is checked against the remote backend here.
    #[tracing::instrument(skip(self, fields), fields(location_id = %location_id, kind = %kind))]
    pub async fn put_config(
        &self,
        tenant: &TenantContext,
        location_id: Uuid,
        kind: ProviderKind,
        fields: &ConfigFields,
    ) -> Result<StorageConfig, AppError> {
        let location = self.registry.get_location(tenant, location_id).await?;
        if location.provider != kind {
            return Err(AppError::InvalidConfigKind(format!(
                "location {} uses {}, got a {} configuration",
                location_id, location.provider, kind
            )));
        }

        let config = validate_provider_config(kind, fields)?;
        let is_active = fields.is_active.unwrap_or(true);
        self.configs.upsert(location_id, &config, is_active).await
    }

    /// Configuration used to reach a location's backend.
    ///
    /// An inactive configuration counts as missing.
    pub async fn get_config(&self, location_id: Uuid) -> Result<StorageConfig, AppError> {
        match self.configs.get(location_id).await? {
            Some(config) if config.is_active => Ok(config),
            Some(_) => {
                tracing::warn!(location_id = %location_id, "Storage configuration is inactive");
                Err(AppError::ConfigNotFound(location_id.to_string()))
            }
            None => Err(AppError::ConfigNotFound(location_id.to_string())),
        }
    }

    /// Admin view with the secret masked. Inactive configurations are shown.
    pub async fn view_config(
        &self,
        tenant: &TenantContext,
        location_id: Uuid,
    ) -> Result<StorageConfigResponse, AppError> {
        self.registry.get_location(tenant, location_id).await?;
        let stored = self
            .configs
            .get(location_id)
            .await?
            .ok_or_else(|| AppError::ConfigNotFound(location_id.to_string()))?;
        Ok(StorageConfigResponse::from(&stored))
    }
}
