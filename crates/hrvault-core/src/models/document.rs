use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::owner::{Owner, OwnerKind};
use super::tenant::TenantContext;
use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::storage_types::{ProviderKind, UrlType};

/// Stored document metadata.
///
/// `location_id`, `provider` and `storage_key` are fixed at upload and always
/// used to reach the bytes, whatever the tenant's active location is now.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub owner: Owner,
    pub document_type_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub location_id: Uuid,
    pub provider: ProviderKind,
    pub storage_key: String,
    pub original_name: String,
    pub display_name: String,
    pub file_size: i64,
    pub extension: Option<String>,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn scope(&self) -> TenantContext {
        TenantContext::new(self.organization_id, self.company_id)
    }

    pub fn belongs_to(&self, scope: &TenantContext) -> bool {
        self.organization_id == scope.organization_id && self.company_id == scope.company_id
    }

    pub fn file_info(&self) -> FileInfo {
        FileInfo {
            name: self.original_name.clone(),
            size: self.file_size,
            size_human: human_readable_size(self.file_size),
            extension: self.extension.clone(),
            mime_type: self.mime_type.clone(),
        }
    }
}

/// Values for inserting a document row after its bytes are stored.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub id: Uuid,
    pub owner: Owner,
    pub document_type_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub location_id: Uuid,
    pub provider: ProviderKind,
    pub storage_key: String,
    pub original_name: String,
    pub display_name: String,
    pub file_size: i64,
    pub extension: Option<String>,
    pub mime_type: String,
}

/// Display metadata changes. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateDocumentRequest {
    #[validate(length(min = 1, max = 255, message = "display_name must be 1-255 characters"))]
    pub display_name: Option<String>,
    pub document_type_id: Option<Uuid>,
}

impl UpdateDocumentRequest {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.document_type_id.is_none()
    }
}

/// List filters. All are optional and combine with AND.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub owner_kind: Option<OwnerKind>,
    pub owner_id: Option<Uuid>,
    pub document_type_id: Option<Uuid>,
    pub provider: Option<ProviderKind>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

impl DocumentFilter {
    pub fn matches(&self, doc: &Document) -> bool {
        self.owner_kind.map_or(true, |k| doc.owner.kind == k)
            && self.owner_id.map_or(true, |id| doc.owner.id == id)
            && self.document_type_id.map_or(true, |t| doc.document_type_id == t)
            && self.provider.map_or(true, |p| doc.provider == p)
            && self.created_from.map_or(true, |from| doc.created_at >= from)
            && self.created_to.map_or(true, |to| doc.created_at <= to)
    }
}

/// One-based page request, clamped to sane bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// How a client reaches a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AccessUrl {
    pub url: String,
    pub url_type: UrlType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessUrl {
    pub fn permanent(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            url_type: UrlType::Permanent,
            expires_at: None,
        }
    }

    pub fn temporary(url: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            url: url.into(),
            url_type: UrlType::Temporary,
            expires_at: Some(expires_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileInfo {
    pub name: String,
    pub size: i64,
    pub size_human: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub owner_type: OwnerKind,
    pub owner_id: Uuid,
    pub document_type_id: Uuid,
    pub display_name: String,
    pub original_name: String,
    pub file_size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    pub mime_type: String,
    pub provider: ProviderKind,
    pub provider_label: String,
    pub location_id: Uuid,
    /// Absent when the backend could not produce a URL.
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_type: Option<UrlType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentResponse {
    pub fn new(doc: Document, access: Option<AccessUrl>) -> Self {
        let (url, url_type, url_expires_at) = match access {
            Some(a) => (Some(a.url), Some(a.url_type), a.expires_at),
            None => (None, None, None),
        };
        DocumentResponse {
            id: doc.id,
            owner_type: doc.owner.kind,
            owner_id: doc.owner.id,
            document_type_id: doc.document_type_id,
            display_name: doc.display_name,
            original_name: doc.original_name,
            file_size: doc.file_size,
            extension: doc.extension,
            mime_type: doc.mime_type,
            provider: doc.provider,
            provider_label: doc.provider.label().to_string(),
            location_id: doc.location_id,
            url,
            url_type,
            url_expires_at,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

/// Render a byte count as e.g. `1.50 MB`.
pub fn human_readable_size(bytes: i64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes.max(0));
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Document {
        Document {
            id: Uuid::new_v4(),
            owner: Owner::staff(Uuid::new_v4()),
            document_type_id: Uuid::new_v4(),
            organization_id: Some(Uuid::new_v4()),
            company_id: None,
            location_id: Uuid::new_v4(),
            provider: ProviderKind::Local,
            storage_key: "org-1/staff/2/3/20240101-abcd1234-contract.pdf".to_string(),
            original_name: "contract.pdf".to_string(),
            display_name: "Employment contract".to_string(),
            file_size: 1536,
            extension: Some("pdf".to_string()),
            mime_type: "application/pdf".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_human_readable_size() {
        assert_eq!(human_readable_size(0), "0 B");
        assert_eq!(human_readable_size(1023), "1023 B");
        assert_eq!(human_readable_size(1536), "1.50 KB");
        assert_eq!(human_readable_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_pagination_bounds() {
        let p = Pagination::new(Some(0), Some(1000));
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, MAX_PAGE_SIZE);
        let p = Pagination::new(Some(3), Some(10));
        assert_eq!(p.offset(), 20);
        assert_eq!(p.limit(), 10);
    }

    #[test]
    fn test_filter_matches() {
        let doc = document();
        assert!(DocumentFilter::default().matches(&doc));
        let by_owner = DocumentFilter {
            owner_kind: Some(OwnerKind::Staff),
            owner_id: Some(doc.owner.id),
            ..Default::default()
        };
        assert!(by_owner.matches(&doc));
        let by_provider = DocumentFilter {
            provider: Some(ProviderKind::Aws),
            ..Default::default()
        };
        assert!(!by_provider.matches(&doc));
    }

    #[test]
    fn test_scope_is_exact() {
        let doc = document();
        assert!(doc.belongs_to(&doc.scope()));
        assert!(!doc.belongs_to(&TenantContext::global()));
    }

    #[test]
    fn test_response_without_url() {
        let doc = document();
        let response = DocumentResponse::new(doc, None);
        assert!(response.url.is_none());
        assert_eq!(response.provider_label, "Local");
        assert_eq!(response.owner_type, OwnerKind::Staff);
        let info = document().file_info();
        assert_eq!(info.size_human, "1.50 KB");
    }

    #[test]
    fn test_update_request_validation() {
        let empty = UpdateDocumentRequest::default();
        assert!(empty.is_empty());
        let blank = UpdateDocumentRequest {
            display_name: Some(String::new()),
            document_type_id: None,
        };
        assert!(blank.validate().is_err());
    }
}
