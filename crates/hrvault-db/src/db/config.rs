//! Backend configuration repository: one row per location in storage_configs.
//!
//! Secret keys are encrypted before they reach the table and decrypted on read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hrvault_core::models::{LocalConfig, ObjectStoreConfig, ProviderConfig, StorageConfig};
use hrvault_core::{AppError, EncryptionService, ProviderKind};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const CONFIG_COLUMNS: &str = "location_id, kind, root_path, base_url, bucket, region, access_key, \
     secret_key_encrypted, endpoint, is_active, created_at, updated_at";

/// Persistence for per-location backend configuration.
#[async_trait]
pub trait StorageConfigStore: Send + Sync {
    async fn get(&self, location_id: Uuid) -> Result<Option<StorageConfig>, AppError>;

    /// Insert or replace the location's configuration.
    async fn upsert(
        &self,
        location_id: Uuid,
        config: &ProviderConfig,
        is_active: bool,
    ) -> Result<StorageConfig, AppError>;

    /// Returns false when no row existed.
    async fn delete(&self, location_id: Uuid) -> Result<bool, AppError>;
}

/// Row type for storage_configs table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct StorageConfigRow {
    pub location_id: Uuid,
    pub kind: ProviderKind,
    pub root_path: Option<String>,
    pub base_url: Option<String>,
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key_encrypted: Option<String>,
    pub endpoint: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StorageConfigRow {
    fn into_storage_config(self, encryption: &EncryptionService) -> Result<StorageConfig, AppError> {
        let missing = |field: &str| {
            AppError::Internal(format!(
                "storage config for location {} has no {}",
                self.location_id, field
            ))
        };

        let config = match self.kind {
            ProviderKind::Local => ProviderConfig::Local(LocalConfig {
                root_path: self.root_path.clone().ok_or_else(|| missing("root_path"))?,
                base_url: self.base_url.clone(),
            }),
            ProviderKind::Wasabi | ProviderKind::Aws => {
                let encrypted = self
                    .secret_key_encrypted
                    .as_deref()
                    .ok_or_else(|| missing("secret_key"))?;
                let cfg = ObjectStoreConfig {
                    bucket: self.bucket.clone().ok_or_else(|| missing("bucket"))?,
                    region: self.region.clone().ok_or_else(|| missing("region"))?,
                    access_key: self.access_key.clone().ok_or_else(|| missing("access_key"))?,
                    secret_key: encryption.decrypt(encrypted)?,
                    endpoint: self.endpoint.clone(),
                };
                if self.kind == ProviderKind::Wasabi {
                    ProviderConfig::Wasabi(cfg)
                } else {
                    ProviderConfig::Aws(cfg)
                }
            }
        };

        Ok(StorageConfig {
            location_id: self.location_id,
            config,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for storage_configs table.
#[derive(Clone)]
pub struct StorageConfigRepository {
    pool: PgPool,
    encryption: EncryptionService,
}

impl StorageConfigRepository {
    pub fn new(pool: PgPool, encryption: EncryptionService) -> Self {
        Self { pool, encryption }
    }
}

#[async_trait]
impl StorageConfigStore for StorageConfigRepository {
    #[tracing::instrument(skip(self), fields(db.table = "storage_configs", db.record_id = %location_id))]
    async fn get(&self, location_id: Uuid) -> Result<Option<StorageConfig>, AppError> {
        let row = sqlx::query_as::<Postgres, StorageConfigRow>(&format!(
            "SELECT {} FROM storage_configs WHERE location_id = $1",
            CONFIG_COLUMNS
        ))
        .bind(location_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_storage_config(&self.encryption))
            .transpose()
    }

    #[tracing::instrument(skip(self, config), fields(db.table = "storage_configs", db.record_id = %location_id, kind = %config.kind()))]
    async fn upsert(
        &self,
        location_id: Uuid,
        config: &ProviderConfig,
        is_active: bool,
    ) -> Result<StorageConfig, AppError> {
        let (root_path, base_url, object_store) = match config {
            ProviderConfig::Local(local) => {
                (Some(local.root_path.clone()), local.base_url.clone(), None)
            }
            ProviderConfig::Wasabi(cfg) | ProviderConfig::Aws(cfg) => (None, None, Some(cfg)),
        };
        let secret_key_encrypted = object_store
            .map(|cfg| self.encryption.encrypt(&cfg.secret_key))
            .transpose()?;

        let row = sqlx::query_as::<Postgres, StorageConfigRow>(&format!(
            r#"
            INSERT INTO storage_configs
                (location_id, kind, root_path, base_url, bucket, region, access_key,
                 secret_key_encrypted, endpoint, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (location_id) DO UPDATE SET
                kind = EXCLUDED.kind,
                root_path = EXCLUDED.root_path,
                base_url = EXCLUDED.base_url,
                bucket = EXCLUDED.bucket,
                region = EXCLUDED.region,
                access_key = EXCLUDED.access_key,
                secret_key_encrypted = EXCLUDED.secret_key_encrypted,
                endpoint = EXCLUDED.endpoint,
                is_active = EXCLUDED.is_active,
                updated_at = NOW()
            RETURNING {}
            "#,
            CONFIG_COLUMNS
        ))
        .bind(location_id)
        .bind(config.kind())
        .bind(root_path)
        .bind(base_url)
        .bind(object_store.map(|c| c.bucket.clone()))
        .bind(object_store.map(|c| c.region.clone()))
        .bind(object_store.map(|c| c.access_key.clone()))
        .bind(secret_key_encrypted)
        .bind(object_store.and_then(|c| c.endpoint.clone()))
        .bind(is_active)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            location_id = %location_id,
            kind = %config.kind(),
            is_active,
            "Storage configuration saved"
        );

        row.into_storage_config(&self.encryption)
    }

    #[tracing::instrument(skip(self), fields(db.table = "storage_configs", db.record_id = %location_id))]
    async fn delete(&self, location_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM storage_configs WHERE location_id = $1")
            .bind(location_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encryption() -> EncryptionService {
        EncryptionService::from_key_bytes(&[3u8; 32]).unwrap()
    }

    fn row(kind: ProviderKind) -> StorageConfigRow {
        StorageConfigRow {
            location_id: Uuid::new_v4(),
            kind,
            root_path: None,
            base_url: None,
            bucket: Some("hr-documents".to_string()),
            region: Some("us-east-1".to_string()),
            access_key: Some("AKIAEXAMPLE".to_string()),
            secret_key_encrypted: Some(encryption().encrypt("plain-secret").unwrap()),
            endpoint: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_decrypts_secret() {
        let config = row(ProviderKind::Aws)
            .into_storage_config(&encryption())
            .unwrap();
        assert_eq!(config.kind(), ProviderKind::Aws);
        assert_eq!(
            config.config.object_store().unwrap().secret_key,
            "plain-secret"
        );
    }

    #[test]
    fn test_local_row_without_root_path_is_internal_error() {
        let err = row(ProviderKind::Local)
            .into_storage_config(&encryption())
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
