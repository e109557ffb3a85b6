//! Storage driver trait
//!
//! This module defines the StorageDriver trait that every backend implements.

use crate::ProviderKind;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use hrvault_core::models::AccessUrl;
use hrvault_core::AppError;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// Network, authentication or timeout failure talking to the backend.
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Chunked object contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Upload body, consumed until EOF.
pub type ByteReader = Pin<Box<dyn AsyncRead + Send + Unpin>>;

/// Handle to an object written by a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRef {
    pub key: String,
    pub size: u64,
}

/// How the bytes of an object are delivered to a client.
pub enum Download {
    /// Bytes served through the application.
    Stream {
        stream: ByteStream,
        size: Option<u64>,
    },
    /// Client fetches the object directly from the backend.
    Redirect(AccessUrl),
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Download::Stream { size, .. } => f
                .debug_struct("Stream")
                .field("size", size)
                .finish_non_exhaustive(),
            Download::Redirect(url) => f.debug_tuple("Redirect").field(url).finish(),
        }
    }
}

/// Storage driver trait
///
/// Implemented by the local filesystem and S3-compatible backends. A driver is
/// built from one location's configuration and only ever addresses that backend.
///
/// **Key format:** see the crate root documentation. Drivers never invent keys;
/// the caller passes the key produced by [`crate::keys::generate_document_key`].
#[async_trait]
pub trait StorageDriver: Send + Sync {
    /// Write the reader's contents under `key`.
    ///
    /// Either the whole object becomes visible or nothing does.
    async fn put(
        &self,
        key: &str,
        reader: ByteReader,
        content_type: &str,
    ) -> StorageResult<StoredRef>;

    /// URL a client can use to fetch the object.
    ///
    /// Object stores return a presigned URL valid for `expires_in` (or the
    /// driver default). Local storage returns a permanent URL.
    async fn url_for(&self, key: &str, expires_in: Option<Duration>) -> StorageResult<AccessUrl>;

    /// Open the object for download.
    async fn open_stream(&self, key: &str) -> StorageResult<Download>;

    /// Remove the object. Deleting an absent object succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if an object exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// The provider this driver talks to
    fn provider(&self) -> ProviderKind;
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => {
                AppError::DocumentNotFound(format!("stored object missing: {}", key))
            }
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::Unavailable(msg)
            | StorageError::UploadFailed(msg)
            | StorageError::DownloadFailed(msg)
            | StorageError::DeleteFailed(msg)
            | StorageError::ConfigError(msg) => AppError::StorageUnavailable(msg),
            StorageError::IoError(e) => AppError::StorageUnavailable(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hrvault_core::ErrorMetadata;

    #[test]
    fn test_storage_error_mapping() {
        let err: AppError = StorageError::Unavailable("timeout".to_string()).into();
        assert!(matches!(err, AppError::StorageUnavailable(_)));
        assert!(err.is_recoverable());

        let err: AppError = StorageError::NotFound("a/b".to_string()).into();
        assert_eq!(err.http_status_code(), 404);

        let err: AppError = StorageError::InvalidKey("../x".to_string()).into();
        assert_eq!(err.http_status_code(), 400);
    }
}
