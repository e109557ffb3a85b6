//! Document service
//!
//! Routes document operations to the storage backend of the right location:
//! new uploads go to the tenant's active location, every later operation goes
//! to the location recorded on the document at upload time.
//!
//! Upload order is store, then persist: the document row exists only once its
//! bytes do. Delete order is the reverse: the row goes only once the object is
//! gone (or was already absent).

use bytes::Bytes;
use chrono::Utc;
use hrvault_core::models::{
    AccessUrl, Document, DocumentFilter, DocumentResponse, FileInfo, NewDocument, Owner,
    Pagination, TenantContext, UpdateDocumentRequest,
};
use hrvault_core::constants::MAX_DISPLAY_NAME_CHARS;
use hrvault_core::{AppError, FieldErrors, ProviderKind};
use hrvault_db::DocumentStore;
use hrvault_storage::keys::generate_document_key;
use hrvault_storage::{ByteReader, Download, StorageDriver, StorageError};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use validator::Validate;

use crate::config::ConfigService;
use crate::driver::DriverFactory;
use crate::location::LocationRegistry;

/// A file received from a client.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub original_name: String,
    /// Declared content type; guessed from the name when absent.
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub owner: Owner,
    pub document_type_id: Uuid,
    pub display_name: Option<String>,
    pub file: UploadFile,
}

#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub document: Document,
    pub provider: ProviderKind,
    pub provider_label: &'static str,
    pub location_id: Uuid,
    /// Absent when the backend could not produce a URL right after the upload.
    pub access: Option<AccessUrl>,
}

#[derive(Debug, Clone)]
pub struct DocumentDetails {
    pub document: Document,
    pub access: Option<AccessUrl>,
    pub file: FileInfo,
}

#[derive(Debug)]
pub struct DocumentDownload {
    pub document: Document,
    pub download: Download,
}

#[derive(Debug, Clone)]
pub struct DocumentPage {
    pub items: Vec<DocumentResponse>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl DocumentPage {
    pub fn total_pages(&self) -> i64 {
        let per_page = i64::from(self.per_page.max(1));
        (self.total + per_page - 1) / per_page
    }
}

#[derive(Clone)]
pub struct DocumentService {
    registry: LocationRegistry,
    configs: ConfigService,
    documents: Arc<dyn DocumentStore>,
    drivers: Arc<dyn DriverFactory>,
}

impl DocumentService {
    pub fn new(
        registry: LocationRegistry,
        configs: ConfigService,
        documents: Arc<dyn DocumentStore>,
        drivers: Arc<dyn DriverFactory>,
    ) -> Self {
        Self {
            registry,
            configs,
            documents,
            drivers,
        }
    }

    /// Driver for a location, built from the configuration as it is now.
    async fn driver_for_location(
        &self,
        location_id: Uuid,
    ) -> Result<Arc<dyn StorageDriver>, AppError> {
        let config = self.configs.get_config(location_id).await?;
        self.drivers.driver_for(&config.config).await
    }

    async fn find(&self, id: Uuid, scope: &TenantContext) -> Result<Document, AppError> {
        self.documents
            .get_scoped(id, scope)
            .await?
            .ok_or_else(|| AppError::DocumentNotFound(id.to_string()))
    }

    /// Store a file in the tenant's active location and record it.
    #[tracing::instrument(
        skip(self, request),
        fields(
            owner_type = %request.owner.kind,
            owner_id = %request.owner.id,
            original_name = %request.file.original_name,
            size_bytes = request.file.data.len()
        )
    )]
    pub async fn upload(
        &self,
        tenant: &TenantContext,
        request: UploadRequest,
    ) -> Result<UploadOutcome, AppError> {
        let UploadRequest {
            owner,
            document_type_id,
            display_name,
            file,
        } = request;

        if file.data.is_empty() {
            return Err(AppError::InvalidInput("file is empty".to_string()));
        }
        let original_name = file.original_name.trim().to_string();
        if original_name.is_empty() {
            return Err(AppError::InvalidInput("file name is required".to_string()));
        }
        let display_name = match display_name.map(|n| n.trim().to_string()) {
            Some(name) if name.chars().count() > MAX_DISPLAY_NAME_CHARS => {
                let mut errors = FieldErrors::new();
                errors.add("display_name", "display_name must be 1-255 characters");
                return Err(AppError::ValidationFailed(errors));
            }
            Some(name) if !name.is_empty() => name,
            _ => original_name.clone(),
        };
        let mime_type = file
            .content_type
            .filter(|ct| !ct.is_empty() && ct != "application/octet-stream")
            .unwrap_or_else(|| {
                mime_guess::from_path(&original_name)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string()
            });

        let location = self.registry.resolve_active_location(tenant).await?;
        let driver = self.driver_for_location(location.id).await?;

        let key = generate_document_key(tenant, &owner, document_type_id, &original_name, Utc::now());
        let reader: ByteReader = Box::pin(Cursor::new(file.data));
        let stored = driver.put(&key, reader, &mime_type).await?;

        let new_document = NewDocument {
            id: Uuid::new_v4(),
            owner,
            document_type_id,
            organization_id: tenant.organization_id,
            company_id: tenant.company_id,
            location_id: location.id,
            provider: driver.provider(),
            storage_key: stored.key.clone(),
            extension: file_extension(&original_name),
            original_name,
            display_name,
            file_size: stored.size as i64,
            mime_type,
        };

        let document = match self.documents.insert(new_document).await {
            Ok(document) => document,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    storage_key = %stored.key,
                    location_id = %location.id,
                    "Failed to record document, removing stored object"
                );
                if let Err(cleanup) = driver.delete(&stored.key).await {
                    tracing::warn!(
                        error = %cleanup,
                        storage_key = %stored.key,
                        "Failed to remove orphaned object"
                    );
                }
                return Err(e);
            }
        };

        let access = match driver.url_for(&document.storage_key, None).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(error = %e, document_id = %document.id, "Failed to build access URL after upload");
                None
            }
        };

        tracing::info!(
            document_id = %document.id,
            location_id = %location.id,
            provider = %document.provider,
            size_bytes = document.file_size,
            "Document uploaded"
        );

        Ok(UploadOutcome {
            provider: document.provider,
            provider_label: document.provider.label(),
            location_id: location.id,
            access,
            document,
        })
    }

    /// Access URL through the document's own location.
    pub async fn get_url(
        &self,
        id: Uuid,
        scope: &TenantContext,
        expires_in: Option<Duration>,
    ) -> Result<AccessUrl, AppError> {
        let document = self.find(id, scope).await?;
        let driver = self.driver_for_location(document.location_id).await?;
        Ok(driver.url_for(&document.storage_key, expires_in).await?)
    }

    /// Bytes for local documents, a redirect for object-store documents.
    pub async fn download(
        &self,
        id: Uuid,
        scope: &TenantContext,
    ) -> Result<DocumentDownload, AppError> {
        let document = self.find(id, scope).await?;
        let driver = self.driver_for_location(document.location_id).await?;
        let download = driver.open_stream(&document.storage_key).await?;
        Ok(DocumentDownload { document, download })
    }

    pub async fn show(&self, id: Uuid, scope: &TenantContext) -> Result<DocumentDetails, AppError> {
        let document = self.find(id, scope).await?;
        let access = self.best_effort_url(&document, &mut HashMap::new()).await;
        let file = document.file_info();
        Ok(DocumentDetails {
            document,
            access,
            file,
        })
    }

    /// Delete the stored object, then the record.
    ///
    /// When the backend cannot be reached the record is kept and the error
    /// returned, so the delete can be retried.
    #[tracing::instrument(skip(self), fields(document_id = %id))]
    pub async fn delete(&self, id: Uuid, scope: &TenantContext) -> Result<(), AppError> {
        let document = self.find(id, scope).await?;
        let driver = self.driver_for_location(document.location_id).await?;

        match driver.delete(&document.storage_key).await {
            Ok(()) => {}
            Err(StorageError::NotFound(_)) => {
                tracing::debug!(storage_key = %document.storage_key, "Object already absent");
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    storage_key = %document.storage_key,
                    location_id = %document.location_id,
                    "Failed to delete stored object, keeping document"
                );
                return Err(e.into());
            }
        }

        if !self.documents.delete(id, scope).await? {
            return Err(AppError::DocumentNotFound(id.to_string()));
        }

        tracing::info!(
            document_id = %id,
            location_id = %document.location_id,
            provider = %document.provider,
            "Document deleted"
        );
        Ok(())
    }

    /// One page of the tenant's documents, each with a best-effort URL.
    pub async fn list(
        &self,
        scope: &TenantContext,
        filter: &DocumentFilter,
        page: Pagination,
    ) -> Result<DocumentPage, AppError> {
        let (documents, total) = self.documents.list(scope, filter, page).await?;

        // One driver per location for the whole page.
        let mut drivers = HashMap::new();
        let mut items = Vec::with_capacity(documents.len());
        for document in documents {
            let access = self.best_effort_url(&document, &mut drivers).await;
            items.push(DocumentResponse::new(document, access));
        }

        Ok(DocumentPage {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    /// Change display name or document type. Stored bytes are never touched.
    pub async fn update_metadata(
        &self,
        id: Uuid,
        scope: &TenantContext,
        request: UpdateDocumentRequest,
    ) -> Result<Document, AppError> {
        request.validate()?;
        if request.is_empty() {
            return Err(AppError::InvalidInput("nothing to update".to_string()));
        }
        let display_name = match request.display_name.map(|n| n.trim().to_string()) {
            Some(name) if name.is_empty() => {
                return Err(AppError::InvalidInput(
                    "display_name must not be blank".to_string(),
                ))
            }
            other => other,
        };

        self.documents
            .update_metadata(id, scope, display_name, request.document_type_id)
            .await?
            .ok_or_else(|| AppError::DocumentNotFound(id.to_string()))
    }

    async fn best_effort_url(
        &self,
        document: &Document,
        drivers: &mut HashMap<Uuid, Option<Arc<dyn StorageDriver>>>,
    ) -> Option<AccessUrl> {
        if !drivers.contains_key(&document.location_id) {
            let driver = match self.driver_for_location(document.location_id).await {
                Ok(driver) => Some(driver),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        location_id = %document.location_id,
                        "No driver for document location"
                    );
                    None
                }
            };
            drivers.insert(document.location_id, driver);
        }

        let driver = drivers.get(&document.location_id).cloned().flatten()?;
        match driver.url_for(&document.storage_key, None).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(error = %e, document_id = %document.id, "Failed to build access URL");
                None
            }
        }
    }
}

fn file_extension(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}
