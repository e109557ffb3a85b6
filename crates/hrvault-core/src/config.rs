//! Configuration module
//!
//! Server, database and storage settings read from the environment.

use std::env;
use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};

use crate::constants::{
    DEFAULT_MAX_UPLOAD_SIZE_BYTES, DEFAULT_OBJECT_STORE_TIMEOUT_SECS,
    DEFAULT_PRESIGNED_URL_EXPIRY_SECS,
};

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const SERVER_PORT: u16 = 4000;

/// Settings shared by every binary that talks to the database.
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

/// Document storage configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub database_url: String,
    /// Root directory of the global default local location.
    pub default_local_storage_path: String,
    /// Public URL prefix for files served from local locations.
    pub local_storage_base_url: String,
    pub presigned_url_expiry_secs: u64,
    pub object_store_timeout_secs: u64,
    pub max_upload_size_bytes: usize,
    /// Base64-encoded 32-byte key for provider secrets at rest.
    pub encryption_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: env::var("SERVER_PORT")
                .or_else(|_| env::var("PORT"))
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SERVER_PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
        };

        let config = Config {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            default_local_storage_path: env::var("DEFAULT_LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| "./storage".to_string()),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:4000/files".to_string()),
            presigned_url_expiry_secs: env::var("PRESIGNED_URL_EXPIRY_SECS")
                .unwrap_or_else(|_| DEFAULT_PRESIGNED_URL_EXPIRY_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_PRESIGNED_URL_EXPIRY_SECS),
            object_store_timeout_secs: env::var("OBJECT_STORE_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_OBJECT_STORE_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_OBJECT_STORE_TIMEOUT_SECS),
            max_upload_size_bytes: env::var("MAX_UPLOAD_SIZE_BYTES")
                .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_SIZE_BYTES.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAX_UPLOAD_SIZE_BYTES),
            encryption_key: env::var("ENCRYPTION_KEY")
                .map_err(|_| anyhow::anyhow!("ENCRYPTION_KEY must be set"))?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.default_local_storage_path.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "DEFAULT_LOCAL_STORAGE_PATH must not be empty"
            ));
        }

        if self.presigned_url_expiry_secs == 0 || self.presigned_url_expiry_secs > 7 * 24 * 3600 {
            return Err(anyhow::anyhow!(
                "PRESIGNED_URL_EXPIRY_SECS must be between 1 and 604800"
            ));
        }

        if self.object_store_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "OBJECT_STORE_TIMEOUT_SECS must be greater than zero"
            ));
        }

        let key = general_purpose::STANDARD
            .decode(self.encryption_key.trim())
            .map_err(|_| anyhow::anyhow!("ENCRYPTION_KEY must be base64 encoded"))?;
        if key.len() != 32 {
            return Err(anyhow::anyhow!(
                "ENCRYPTION_KEY must decode to 32 bytes (256 bits)"
            ));
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.base.db_timeout_seconds
    }

    pub fn default_local_storage_path(&self) -> &str {
        &self.default_local_storage_path
    }

    pub fn local_storage_base_url(&self) -> &str {
        &self.local_storage_base_url
    }

    pub fn presigned_url_expiry(&self) -> Duration {
        Duration::from_secs(self.presigned_url_expiry_secs)
    }

    pub fn object_store_timeout(&self) -> Duration {
        Duration::from_secs(self.object_store_timeout_secs)
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.max_upload_size_bytes
    }

    pub fn encryption_key(&self) -> &str {
        &self.encryption_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            base: BaseConfig {
                server_port: 4000,
                cors_origins: vec!["*".to_string()],
                db_max_connections: 5,
                db_timeout_seconds: 5,
                environment: "development".to_string(),
            },
            database_url: "postgres://localhost/hrvault".to_string(),
            default_local_storage_path: "/var/lib/hrvault".to_string(),
            local_storage_base_url: "http://localhost:4000/files".to_string(),
            presigned_url_expiry_secs: DEFAULT_PRESIGNED_URL_EXPIRY_SECS,
            object_store_timeout_secs: DEFAULT_OBJECT_STORE_TIMEOUT_SECS,
            max_upload_size_bytes: DEFAULT_MAX_UPLOAD_SIZE_BYTES,
            encryption_key: general_purpose::STANDARD.encode([7u8; 32]),
        }
    }

    #[test]
    fn test_sample_config_is_valid() {
        let config = sample();
        assert!(config.validate().is_ok());
        assert_eq!(config.presigned_url_expiry(), Duration::from_secs(3600));
        assert_eq!(config.object_store_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let mut config = sample();
        config.base.environment = "production".to_string();
        assert!(config.validate().is_err());

        config.base.cors_origins = vec!["https://hr.example.com".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_short_encryption_key_rejected() {
        let mut config = sample();
        config.encryption_key = general_purpose::STANDARD.encode([1u8; 16]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_postgres_url_rejected() {
        let mut config = sample();
        config.database_url = "mysql://localhost/hrvault".to_string();
        assert!(config.validate().is_err());
    }
}
