//! In-memory repository implementations for testing
//!
//! All three stores share one state so the referential rules of the schema
//! (documents and configs pin their location) hold without a database.

use async_trait::async_trait;
use chrono::Utc;
use hrvault_core::models::{
    Document, DocumentFilter, Location, NewDocument, Pagination, ProviderConfig, StorageConfig,
    TenantContext,
};
use hrvault_core::{AppError, ProviderKind};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::db::{DocumentStore, LocationStore, StorageConfigStore};

#[derive(Default)]
struct State {
    locations: HashMap<Uuid, Location>,
    configs: HashMap<Uuid, StorageConfig>,
    documents: HashMap<Uuid, Document>,
    fail_document_inserts: bool,
}

/// Shared backing state for the in-memory stores.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    state: Arc<Mutex<State>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn locations(&self) -> InMemoryLocationStore {
        InMemoryLocationStore { db: self.clone() }
    }

    pub fn configs(&self) -> InMemoryConfigStore {
        InMemoryConfigStore { db: self.clone() }
    }

    pub fn documents(&self) -> InMemoryDocumentStore {
        InMemoryDocumentStore { db: self.clone() }
    }

    /// Make every document insert fail, as a lost database connection would.
    pub fn fail_document_inserts(&self, fail: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_document_inserts = fail;
        }
    }

    pub fn document_count(&self) -> usize {
        self.state.lock().map(|s| s.documents.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, AppError> {
        self.state
            .lock()
            .map_err(|_| AppError::Internal("in-memory store lock poisoned".to_string()))
    }
}

#[derive(Clone)]
pub struct InMemoryLocationStore {
    db: InMemoryDatabase,
}

#[async_trait]
impl LocationStore for InMemoryLocationStore {
    async fn create(
        &self,
        tenant: &TenantContext,
        provider: ProviderKind,
    ) -> Result<Location, AppError> {
        let now = Utc::now();
        let location = Location {
            id: Uuid::new_v4(),
            provider,
            organization_id: tenant.organization_id,
            company_id: tenant.company_id,
            is_active: false,
            created_at: now,
            updated_at: now,
        };
        self.db
            .lock()?
            .locations
            .insert(location.id, location.clone());
        Ok(location)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Location>, AppError> {
        Ok(self.db.lock()?.locations.get(&id).cloned())
    }

    async fn list_for_tenant(&self, tenant: &TenantContext) -> Result<Vec<Location>, AppError> {
        let state = self.db.lock()?;
        let mut locations: Vec<Location> = state
            .locations
            .values()
            .filter(|l| l.belongs_to(tenant))
            .cloned()
            .collect();
        locations.sort_by_key(|l| l.created_at);
        Ok(locations)
    }

    async fn find_active(&self, tenant: &TenantContext) -> Result<Option<Location>, AppError> {
        Ok(self
            .db
            .lock()?
            .locations
            .values()
            .find(|l| l.is_active && l.belongs_to(tenant))
            .cloned())
    }

    async fn set_active(&self, tenant: &TenantContext, id: Uuid) -> Result<Location, AppError> {
        let mut state = self.db.lock()?;
        let owned = state
            .locations
            .get(&id)
            .map(|l| l.belongs_to(tenant))
            .unwrap_or(false);
        if !owned {
            return Err(AppError::LocationNotFound(id.to_string()));
        }

        let now = Utc::now();
        for location in state.locations.values_mut() {
            if location.belongs_to(tenant) {
                let active = location.id == id;
                if location.is_active != active {
                    location.is_active = active;
                    location.updated_at = now;
                }
            }
        }

        state
            .locations
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::LocationNotFound(id.to_string()))
    }

    async fn update_provider(
        &self,
        id: Uuid,
        provider: ProviderKind,
    ) -> Result<Option<Location>, AppError> {
        let mut state = self.db.lock()?;
        if state.documents.values().any(|d| d.location_id == id) {
            return Ok(None);
        }
        Ok(state.locations.get_mut(&id).map(|location| {
            location.provider = provider;
            location.updated_at = Utc::now();
            location.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.db.lock()?;
        if state.documents.values().any(|d| d.location_id == id) {
            return Err(AppError::LocationInUse(
                "location is still referenced".to_string(),
            ));
        }
        state.configs.remove(&id);
        Ok(state.locations.remove(&id).is_some())
    }
}

#[derive(Clone)]
pub struct InMemoryConfigStore {
    db: InMemoryDatabase,
}

#[async_trait]
impl StorageConfigStore for InMemoryConfigStore {
    async fn get(&self, location_id: Uuid) -> Result<Option<StorageConfig>, AppError> {
        Ok(self.db.lock()?.configs.get(&location_id).cloned())
    }

    async fn upsert(
        &self,
        location_id: Uuid,
        config: &ProviderConfig,
        is_active: bool,
    ) -> Result<StorageConfig, AppError> {
        let mut state = self.db.lock()?;
        if !state.locations.contains_key(&location_id) {
            return Err(AppError::LocationNotFound(location_id.to_string()));
        }

        let now = Utc::now();
        let created_at = state
            .configs
            .get(&location_id)
            .map(|c| c.created_at)
            .unwrap_or(now);
        let stored = StorageConfig {
            location_id,
            config: config.clone(),
            is_active,
            created_at,
            updated_at: now,
        };
        state.configs.insert(location_id, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, location_id: Uuid) -> Result<bool, AppError> {
        Ok(self.db.lock()?.configs.remove(&location_id).is_some())
    }
}

#[derive(Clone)]
pub struct InMemoryDocumentStore {
    db: InMemoryDatabase,
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, document: NewDocument) -> Result<Document, AppError> {
        let mut state = self.db.lock()?;
        if state.fail_document_inserts {
            return Err(AppError::Internal("document insert failed".to_string()));
        }
        if !state.locations.contains_key(&document.location_id) {
            return Err(AppError::LocationNotFound(document.location_id.to_string()));
        }

        let now = Utc::now();
        let stored = Document {
            id: document.id,
            owner: document.owner,
            document_type_id: document.document_type_id,
            organization_id: document.organization_id,
            company_id: document.company_id,
            location_id: document.location_id,
            provider: document.provider,
            storage_key: document.storage_key,
            original_name: document.original_name,
            display_name: document.display_name,
            file_size: document.file_size,
            extension: document.extension,
            mime_type: document.mime_type,
            created_at: now,
            updated_at: now,
        };
        state.documents.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_scoped(
        &self,
        id: Uuid,
        scope: &TenantContext,
    ) -> Result<Option<Document>, AppError> {
        Ok(self
            .db
            .lock()?
            .documents
            .get(&id)
            .filter(|d| d.belongs_to(scope))
            .cloned())
    }

    async fn list(
        &self,
        scope: &TenantContext,
        filter: &DocumentFilter,
        page: Pagination,
    ) -> Result<(Vec<Document>, i64), AppError> {
        let state = self.db.lock()?;
        let mut matching: Vec<&Document> = state
            .documents
            .values()
            .filter(|d| d.belongs_to(scope) && filter.matches(d))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn update_metadata(
        &self,
        id: Uuid,
        scope: &TenantContext,
        display_name: Option<String>,
        document_type_id: Option<Uuid>,
    ) -> Result<Option<Document>, AppError> {
        let mut state = self.db.lock()?;
        let Some(doc) = state
            .documents
            .get_mut(&id)
            .filter(|d| d.belongs_to(scope))
        else {
            return Ok(None);
        };
        if let Some(name) = display_name {
            doc.display_name = name;
        }
        if let Some(type_id) = document_type_id {
            doc.document_type_id = type_id;
        }
        doc.updated_at = Utc::now();
        Ok(Some(doc.clone()))
    }

    async fn delete(&self, id: Uuid, scope: &TenantContext) -> Result<bool, AppError> {
        let mut state = self.db.lock()?;
        let in_scope = state
            .documents
            .get(&id)
            .map(|d| d.belongs_to(scope))
            .unwrap_or(false);
        if in_scope {
            state.documents.remove(&id);
        }
        Ok(in_scope)
    }

    async fn count_for_location(&self, location_id: Uuid) -> Result<i64, AppError> {
        Ok(self
            .db
            .lock()?
            .documents
            .values()
            .filter(|d| d.location_id == location_id)
            .count() as i64)
    }
}
