//! Storage location repository: CRUD for the storage_locations table.

use async_trait::async_trait;
use hrvault_core::models::{Location, TenantContext};
use hrvault_core::{AppError, ProviderKind};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::map_reference_violation;

const LOCATION_COLUMNS: &str =
    "id, provider, organization_id, company_id, is_active, created_at, updated_at";

/// Persistence for storage locations.
///
/// Tenant arguments are matched exactly: `TenantContext::global()` addresses
/// only locations with neither reference set.
#[async_trait]
pub trait LocationStore: Send + Sync {
    async fn create(
        &self,
        tenant: &TenantContext,
        provider: ProviderKind,
    ) -> Result<Location, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Location>, AppError>;

    async fn list_for_tenant(&self, tenant: &TenantContext) -> Result<Vec<Location>, AppError>;

    async fn find_active(&self, tenant: &TenantContext) -> Result<Option<Location>, AppError>;

    /// Make `id` the tenant's only active location.
    async fn set_active(&self, tenant: &TenantContext, id: Uuid) -> Result<Location, AppError>;

    async fn update_provider(
        &self,
        id: Uuid,
        provider: ProviderKind,
    ) -> Result<Option<Location>, AppError>;

    /// Remove the location together with its backend configuration.
    ///
    /// Both go or neither does. Fails with `LocationInUse` while documents
    /// reference the location. Returns false when no row existed.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Repository for storage_locations table.
#[derive(Clone)]
pub struct LocationRepository {
    pool: PgPool,
}

impl LocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationStore for LocationRepository {
    #[tracing::instrument(skip(self), fields(db.table = "storage_locations", db.operation = "insert"))]
    async fn create(
        &self,
        tenant: &TenantContext,
        provider: ProviderKind,
    ) -> Result<Location, AppError> {
        let location = sqlx::query_as::<Postgres, Location>(&format!(
            r#"
            INSERT INTO storage_locations (id, provider, organization_id, company_id, is_active)
            VALUES ($1, $2, $3, $4, FALSE)
            RETURNING {}
            "#,
            LOCATION_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(provider)
        .bind(tenant.organization_id)
        .bind(tenant.company_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(location)
    }

    #[tracing::instrument(skip(self), fields(db.table = "storage_locations", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Location>, AppError> {
        let location = sqlx::query_as::<Postgres, Location>(&format!(
            "SELECT {} FROM storage_locations WHERE id = $1",
            LOCATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    #[tracing::instrument(skip(self), fields(db.table = "storage_locations"))]
    async fn list_for_tenant(&self, tenant: &TenantContext) -> Result<Vec<Location>, AppError> {
        let locations = sqlx::query_as::<Postgres, Location>(&format!(
            r#"
            SELECT {} FROM storage_locations
            WHERE organization_id IS NOT DISTINCT FROM $1
              AND company_id IS NOT DISTINCT FROM $2
            ORDER BY created_at ASC
            "#,
            LOCATION_COLUMNS
        ))
        .bind(tenant.organization_id)
        .bind(tenant.company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }

    #[tracing::instrument(skip(self), fields(db.table = "storage_locations"))]
    async fn find_active(&self, tenant: &TenantContext) -> Result<Option<Location>, AppError> {
        let location = sqlx::query_as::<Postgres, Location>(&format!(
            r#"
            SELECT {} FROM storage_locations
            WHERE organization_id IS NOT DISTINCT FROM $1
              AND company_id IS NOT DISTINCT FROM $2
              AND is_active
            "#,
            LOCATION_COLUMNS
        ))
        .bind(tenant.organization_id)
        .bind(tenant.company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    #[tracing::instrument(skip(self), fields(db.table = "storage_locations", db.record_id = %id))]
    async fn set_active(&self, tenant: &TenantContext, id: Uuid) -> Result<Location, AppError> {
        let mut tx = self.pool.begin().await?;

        // Lock the tenant's rows so concurrent activations serialize.
        let owned: Option<Uuid> = sqlx::query_scalar::<Postgres, Uuid>(
            r#"
            SELECT id FROM storage_locations
            WHERE id = $1
              AND organization_id IS NOT DISTINCT FROM $2
              AND company_id IS NOT DISTINCT FROM $3
            FOR UPDATE
            "#,
        )
        .bind(id)
        .bind(tenant.organization_id)
        .bind(tenant.company_id)
        .fetch_optional(&mut *tx)
        .await?;

        if owned.is_none() {
            tx.rollback().await?;
            return Err(AppError::LocationNotFound(id.to_string()));
        }

        sqlx::query(
            r#"
            UPDATE storage_locations
            SET is_active = FALSE, updated_at = NOW()
            WHERE organization_id IS NOT DISTINCT FROM $1
              AND company_id IS NOT DISTINCT FROM $2
              AND is_active
              AND id <> $3
            "#,
        )
        .bind(tenant.organization_id)
        .bind(tenant.company_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let location = sqlx::query_as::<Postgres, Location>(&format!(
            r#"
            UPDATE storage_locations
            SET is_active = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            LOCATION_COLUMNS
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            location_id = %id,
            provider = %location.provider,
            "Active storage location switched"
        );

        Ok(location)
    }

    #[tracing::instrument(skip(self), fields(db.table = "storage_locations", db.record_id = %id))]
    async fn update_provider(
        &self,
        id: Uuid,
        provider: ProviderKind,
    ) -> Result<Option<Location>, AppError> {
        // Refuse at the row level as well once documents point here.
        let location = sqlx::query_as::<Postgres, Location>(&format!(
            r#"
            UPDATE storage_locations
            SET provider = $2, updated_at = NOW()
            WHERE id = $1
              AND NOT EXISTS (SELECT 1 FROM documents WHERE location_id = $1)
            RETURNING {}
            "#,
            LOCATION_COLUMNS
        ))
        .bind(id)
        .bind(provider)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    #[tracing::instrument(skip(self), fields(db.table = "storage_locations", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM storage_configs WHERE location_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        // Rolled back on drop when documents still point here.
        let result = sqlx::query("DELETE FROM storage_locations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_reference_violation(e, "location is still referenced"))?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
