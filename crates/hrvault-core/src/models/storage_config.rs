//! Backend configuration for a storage location.
//!
//! The configuration is a sum type keyed by provider kind. A location's config
//! kind always equals the location's provider.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::encryption::mask_secret;
use crate::storage_types::ProviderKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalConfig {
    pub root_path: String,
    pub base_url: Option<String>,
}

/// Credentials and addressing for an S3-compatible bucket.
///
/// `endpoint` is required for Wasabi and optional for AWS, where the regional
/// AWS endpoint is implied.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub endpoint: Option<String>,
}

impl Debug for ObjectStoreConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ObjectStoreConfig")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProviderConfig {
    Local(LocalConfig),
    Wasabi(ObjectStoreConfig),
    Aws(ObjectStoreConfig),
}

impl ProviderConfig {
    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderConfig::Local(_) => ProviderKind::Local,
            ProviderConfig::Wasabi(_) => ProviderKind::Wasabi,
            ProviderConfig::Aws(_) => ProviderKind::Aws,
        }
    }

    pub fn object_store(&self) -> Option<&ObjectStoreConfig> {
        match self {
            ProviderConfig::Local(_) => None,
            ProviderConfig::Wasabi(cfg) | ProviderConfig::Aws(cfg) => Some(cfg),
        }
    }
}

/// Backend configuration attached to a location.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub location_id: Uuid,
    pub config: ProviderConfig,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StorageConfig {
    pub fn kind(&self) -> ProviderKind {
        self.config.kind()
    }
}

/// Fields accepted by the config endpoints. The kind comes from the route.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ConfigFields {
    pub root_path: Option<String>,
    pub base_url: Option<String>,
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub endpoint: Option<String>,
    pub is_active: Option<bool>,
}

/// Read view of a config; the secret key is masked.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StorageConfigResponse {
    pub location_id: Uuid,
    pub kind: ProviderKind,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&StorageConfig> for StorageConfigResponse {
    fn from(stored: &StorageConfig) -> Self {
        let mut response = StorageConfigResponse {
            location_id: stored.location_id,
            kind: stored.kind(),
            is_active: stored.is_active,
            root_path: None,
            base_url: None,
            bucket: None,
            region: None,
            access_key: None,
            secret_key: None,
            endpoint: None,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        };

        match &stored.config {
            ProviderConfig::Local(local) => {
                response.root_path = Some(local.root_path.clone());
                response.base_url = local.base_url.clone();
            }
            ProviderConfig::Wasabi(cfg) | ProviderConfig::Aws(cfg) => {
                response.bucket = Some(cfg.bucket.clone());
                response.region = Some(cfg.region.clone());
                response.access_key = Some(cfg.access_key.clone());
                response.secret_key = Some(mask_secret(&cfg.secret_key));
                response.endpoint = cfg.endpoint.clone();
            }
        }

        response
    }
}
