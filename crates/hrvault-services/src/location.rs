//! Location registry: which storage location serves a tenant.
//!
//! Resolution order for uploads is organization, then company, then the
//! global default location. Administration always works on exactly one scope.

use hrvault_core::models::{LocalConfig, Location, ProviderConfig, TenantContext};
use hrvault_core::{AppError, ProviderKind};
use hrvault_db::{DocumentStore, LocationStore, StorageConfigStore};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct LocationRegistry {
    locations: Arc<dyn LocationStore>,
    configs: Arc<dyn StorageConfigStore>,
    documents: Arc<dyn DocumentStore>,
}

impl LocationRegistry {
    pub fn new(
        locations: Arc<dyn LocationStore>,
        configs: Arc<dyn StorageConfigStore>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            locations,
            configs,
            documents,
        }
    }

    /// Location new uploads for `tenant` go to.
    #[tracing::instrument(skip(self), fields(organization_id = ?tenant.organization_id, company_id = ?tenant.company_id))]
    pub async fn resolve_active_location(&self, tenant: &TenantContext) -> Result<Location, AppError> {
        let by_organization = match tenant.organization_id {
            Some(id) => {
                self.locations
                    .find_active(&TenantContext::organization(id))
                    .await?
            }
            None => None,
        };
        let by_company = match tenant.company_id {
            Some(id) => self.locations.find_active(&TenantContext::company(id)).await?,
            None => None,
        };

        match (by_organization, by_company) {
            (Some(org), Some(company)) if org.id != company.id => {
                Err(AppError::AmbiguousTenantReference(format!(
                    "organization and company each have an active location ({} and {})",
                    org.id, company.id
                )))
            }
            (Some(location), _) | (None, Some(location)) => {
                tracing::debug!(location_id = %location.id, provider = %location.provider, "Resolved tenant location");
                Ok(location)
            }
            (None, None) => {
                let location = self
                    .locations
                    .find_active(&TenantContext::global())
                    .await?
                    .ok_or_else(|| {
                        AppError::LocationNotFound("no default storage location".to_string())
                    })?;
                tracing::debug!(location_id = %location.id, "Tenant has no location, using default");
                Ok(location)
            }
        }
    }

    /// Make `location_id` the tenant's active location. Documents are untouched.
    pub async fn set_active_location(
        &self,
        tenant: &TenantContext,
        location_id: Uuid,
    ) -> Result<Location, AppError> {
        let scope = admin_scope(tenant)?;
        self.locations.set_active(&scope, location_id).await
    }

    pub async fn create_location(
        &self,
        tenant: &TenantContext,
        provider: ProviderKind,
        activate: bool,
    ) -> Result<Location, AppError> {
        let scope = admin_scope(tenant)?;
        let location = self.locations.create(&scope, provider).await?;

        tracing::info!(
            location_id = %location.id,
            provider = %provider,
            activate,
            "Storage location created"
        );

        if activate {
            return self.locations.set_active(&scope, location.id).await;
        }
        Ok(location)
    }

    /// Location `location_id` if the tenant administers it.
    pub async fn get_location(
        &self,
        tenant: &TenantContext,
        location_id: Uuid,
    ) -> Result<Location, AppError> {
        let scope = admin_scope(tenant)?;
        self.locations
            .get(location_id)
            .await?
            .filter(|l| l.belongs_to(&scope))
            .ok_or_else(|| AppError::LocationNotFound(location_id.to_string()))
    }

    pub async fn list_locations(&self, tenant: &TenantContext) -> Result<Vec<Location>, AppError> {
        let scope = admin_scope(tenant)?;
        self.locations.list_for_tenant(&scope).await
    }

    /// Switch a location to another provider while nothing is stored in it.
    ///
    /// The existing configuration no longer matches and is removed.
    pub async fn change_provider(
        &self,
        tenant: &TenantContext,
        location_id: Uuid,
        provider: ProviderKind,
    ) -> Result<Location, AppError> {
        let location = self.get_location(tenant, location_id).await?;
        if location.provider == provider {
            return Ok(location);
        }

        let stored = self.documents.count_for_location(location_id).await?;
        if stored > 0 {
            return Err(AppError::LocationInUse(format!(
                "location {} holds {} document(s)",
                location_id, stored
            )));
        }

        let updated = self
            .locations
            .update_provider(location_id, provider)
            .await?
            .ok_or_else(|| {
                AppError::LocationInUse(format!("location {} holds documents", location_id))
            })?;
        self.configs.delete(location_id).await?;

        tracing::info!(
            location_id = %location_id,
            from = %location.provider,
            to = %provider,
            "Storage location provider changed"
        );

        Ok(updated)
    }

    pub async fn delete_location(
        &self,
        tenant: &TenantContext,
        location_id: Uuid,
    ) -> Result<(), AppError> {
        let location = self.get_location(tenant, location_id).await?;
        if location.is_active {
            return Err(AppError::LocationInUse(format!(
                "location {} is the active location",
                location_id
            )));
        }

        let stored = self.documents.count_for_location(location_id).await?;
        if stored > 0 {
            return Err(AppError::LocationInUse(format!(
                "location {} holds {} document(s)",
                location_id, stored
            )));
        }

        if !self.locations.delete(location_id).await? {
            return Err(AppError::LocationNotFound(location_id.to_string()));
        }

        tracing::info!(location_id = %location_id, "Storage location deleted");
        Ok(())
    }

    /// Make sure the global default location exists: local, rooted at `root_path`.
    ///
    /// Run at startup. An existing default location is kept as it is; only a
    /// missing configuration is filled in.
    pub async fn ensure_default_location(&self, root_path: &str) -> Result<Location, AppError> {
        let global = TenantContext::global();

        let location = match self.locations.find_active(&global).await? {
            Some(location) => location,
            None => {
                let created = self.locations.create(&global, ProviderKind::Local).await?;
                self.locations.set_active(&global, created.id).await?
            }
        };

        if location.provider == ProviderKind::Local
            && self.configs.get(location.id).await?.is_none()
        {
            let config = ProviderConfig::Local(LocalConfig {
                root_path: root_path.to_string(),
                base_url: None,
            });
            self.configs.upsert(location.id, &config, true).await?;
            tracing::info!(
                location_id = %location.id,
                root_path = %root_path,
                "Default local storage location configured"
            );
        }

        Ok(location)
    }
}

/// Administration addresses one scope: organization, company or global.
fn admin_scope(tenant: &TenantContext) -> Result<TenantContext, AppError> {
    if tenant.organization_id.is_some() && tenant.company_id.is_some() {
        return Err(AppError::AmbiguousTenantReference(
            "location administration takes either an organization or a company".to_string(),
        ));
    }
    Ok(*tenant)
}
