//! In-memory S3-compatible backend.
//!
//! Objects live in a map; URLs are presigned by a real `S3Storage`, which
//! signs locally without touching the network.

use async_trait::async_trait;
use bytes::Bytes;
use hrvault_core::models::{AccessUrl, ObjectStoreConfig, ProviderConfig};
use hrvault_core::{AppError, ProviderKind};
use hrvault_services::{BackendDriverFactory, DriverFactory};
use hrvault_storage::{
    ByteReader, Download, DriverOptions, S3Storage, StorageDriver, StorageError, StorageResult,
    StoredRef,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::AsyncReadExt;

struct StoredObject {
    data: Bytes,
    content_type: String,
}

pub struct StubObjectStore {
    presigner: S3Storage,
    objects: Mutex<HashMap<String, StoredObject>>,
    fail_delete: AtomicBool,
}

impl StubObjectStore {
    pub fn new(provider: ProviderKind, config: &ObjectStoreConfig) -> Self {
        Self {
            presigner: S3Storage::new(
                provider,
                config,
                Duration::from_secs(5),
                Duration::from_secs(3600),
            )
            .unwrap(),
            objects: Mutex::new(HashMap::new()),
            fail_delete: AtomicBool::new(false),
        }
    }

    /// Make deletes fail as an unreachable backend would.
    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(key).map(|o| o.data.clone())
    }

    /// Content type the object was written with.
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|o| o.content_type.clone())
    }
}

#[async_trait]
impl StorageDriver for StubObjectStore {
    async fn put(
        &self,
        key: &str,
        mut reader: ByteReader,
        content_type: &str,
    ) -> StorageResult<StoredRef> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer).await?;
        let size = buffer.len() as u64;
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                data: Bytes::from(buffer),
                content_type: content_type.to_string(),
            },
        );
        Ok(StoredRef {
            key: key.to_string(),
            size,
        })
    }

    async fn url_for(&self, key: &str, expires_in: Option<Duration>) -> StorageResult<AccessUrl> {
        self.presigner.url_for(key, expires_in).await
    }

    async fn open_stream(&self, key: &str) -> StorageResult<Download> {
        Ok(Download::Redirect(self.url_for(key, None).await?))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("connection timed out".to_string()));
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.contains(key))
    }

    fn provider(&self) -> ProviderKind {
        self.presigner.provider()
    }
}

/// Real local drivers, in-memory object stores keyed by bucket.
pub struct StubDriverFactory {
    local: BackendDriverFactory,
    stores: Mutex<HashMap<String, Arc<StubObjectStore>>>,
}

impl StubDriverFactory {
    pub fn new(local_base_url: &str) -> Self {
        Self {
            local: BackendDriverFactory::new(DriverOptions {
                local_base_url: local_base_url.to_string(),
                ..Default::default()
            }),
            stores: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self, bucket: &str) -> Arc<StubObjectStore> {
        self.stores
            .lock()
            .unwrap()
            .get(bucket)
            .cloned()
            .expect("no object store for bucket")
    }
}

#[async_trait]
impl DriverFactory for StubDriverFactory {
    async fn driver_for(&self, config: &ProviderConfig) -> Result<Arc<dyn StorageDriver>, AppError> {
        match config {
            ProviderConfig::Local(_) => self.local.driver_for(config).await,
            ProviderConfig::Wasabi(cfg) | ProviderConfig::Aws(cfg) => {
                let store = self
                    .stores
                    .lock()
                    .unwrap()
                    .entry(cfg.bucket.clone())
                    .or_insert_with(|| Arc::new(StubObjectStore::new(config.kind(), cfg)))
                    .clone();
                Ok(store)
            }
        }
    }
}
