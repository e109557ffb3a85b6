//! Document endpoints.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson, ValidatedQuery};
use crate::extract::Tenant;
use crate::response::{ApiResponse, Paginated};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use hrvault_core::constants::MAX_URL_EXPIRY_SECS;
use hrvault_core::models::{
    AccessUrl, DocumentFilter, DocumentResponse, FileInfo, Owner, OwnerKind, Pagination,
    UpdateDocumentRequest,
};
use hrvault_core::{AppError, ProviderKind};
use hrvault_services::{UploadFile, UploadRequest};
use hrvault_storage::Download;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct DocumentListQuery {
    pub owner_type: Option<OwnerKind>,
    pub owner_id: Option<Uuid>,
    pub document_type_id: Option<Uuid>,
    pub provider: Option<ProviderKind>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl DocumentListQuery {
    fn filter(&self) -> DocumentFilter {
        DocumentFilter {
            owner_kind: self.owner_type,
            owner_id: self.owner_id,
            document_type_id: self.document_type_id,
            provider: self.provider,
            created_from: self.created_from,
            created_to: self.created_to,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UrlQuery {
    /// Lifetime of a temporary URL in seconds. Ignored for local storage.
    pub expires_in: Option<u64>,
}

/// Where to fetch an object-store document; the bytes never pass through here.
#[derive(Debug, Serialize, ToSchema)]
pub struct DownloadLinkResponse {
    pub download_url: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub storage_type: ProviderKind,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentDetailsResponse {
    #[serde(flatten)]
    pub document: DocumentResponse,
    pub file: FileInfo,
}

/// Form fields collected from the multipart body.
#[derive(Default)]
struct UploadForm {
    file: Option<UploadFile>,
    document_type_id: Option<String>,
    owner_type: Option<String>,
    owner_id: Option<String>,
    display_name: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart, max_size: usize) -> Result<Self, AppError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
        {
            let name = field.name().map(str::to_string).unwrap_or_default();
            if name == "file" {
                if form.file.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }
                let original_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let data: Bytes = field.bytes().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read file data: {}", e))
                })?;
                if data.len() > max_size {
                    return Err(AppError::PayloadTooLarge(format!(
                        "File size exceeds maximum allowed size of {} bytes",
                        max_size
                    )));
                }
                form.file = Some(UploadFile {
                    original_name,
                    content_type,
                    data,
                });
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read field {}: {}", name, e)))?;
            match name.as_str() {
                "document_type_id" => form.document_type_id = Some(value),
                "owner_type" => form.owner_type = Some(value),
                "owner_id" => form.owner_id = Some(value),
                "display_name" => form.display_name = Some(value),
                _ => {}
            }
        }

        Ok(form)
    }

    fn into_request(self) -> Result<UploadRequest, AppError> {
        let file = self
            .file
            .ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;
        let document_type_id = parse_uuid_field("document_type_id", self.document_type_id)?;
        let owner_id = parse_uuid_field("owner_id", self.owner_id)?;
        let owner_kind: OwnerKind = self
            .owner_type
            .ok_or_else(|| AppError::InvalidInput("owner_type is required".to_string()))?
            .parse()
            .map_err(|e: anyhow::Error| AppError::InvalidInput(e.to_string()))?;

        Ok(UploadRequest {
            owner: Owner::new(owner_kind, owner_id),
            document_type_id,
            display_name: self.display_name.filter(|n| !n.trim().is_empty()),
            file,
        })
    }
}

fn parse_uuid_field(name: &str, value: Option<String>) -> Result<Uuid, AppError> {
    let value = value.ok_or_else(|| AppError::InvalidInput(format!("{} is required", name)))?;
    Uuid::parse_str(value.trim())
        .map_err(|_| AppError::InvalidInput(format!("{} must be a UUID", name)))
}

fn content_disposition(filename: &str) -> HeaderValue {
    let escaped: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if c == '"' { '\'' } else { c })
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{}\"", escaped))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

#[utoipa::path(
    post,
    path = "/api/v1/documents",
    tag = "documents",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document stored on the tenant's active location", body = DocumentResponse),
        (status = 400, description = "Invalid input or ambiguous tenant", body = ErrorResponse),
        (status = 404, description = "No usable storage location", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 502, description = "Storage backend unavailable", body = ErrorResponse)
    )
)]
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = UploadForm::read(multipart, state.max_upload_size_bytes).await?;
    let request = form.into_request()?;

    let outcome = state.documents.upload(&tenant, request).await?;

    Ok(ApiResponse::created(
        "Document uploaded",
        DocumentResponse::new(outcome.document, outcome.access),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/documents",
    tag = "documents",
    params(DocumentListQuery),
    responses(
        (status = 200, description = "One page of documents, newest first"),
        (status = 400, description = "Invalid query", body = ErrorResponse)
    )
)]
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
    ValidatedQuery(query): ValidatedQuery<DocumentListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let page = Pagination::new(query.page, query.per_page);
    let result = state
        .documents
        .list(&tenant, &query.filter(), page)
        .await?;

    let total_pages = result.total_pages();
    Ok(ApiResponse::ok(
        "Documents retrieved",
        Paginated {
            items: result.items,
            total: result.total,
            page: result.page,
            per_page: result.per_page,
            total_pages,
        },
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/documents/{id}",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document with file details", body = DocumentDetailsResponse),
        (status = 404, description = "Document not found", body = ErrorResponse)
    )
)]
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let details = state.documents.show(id, &tenant).await?;
    Ok(ApiResponse::ok(
        "Document retrieved",
        DocumentDetailsResponse {
            document: DocumentResponse::new(details.document, details.access),
            file: details.file,
        },
    ))
}

#[utoipa::path(
    patch,
    path = "/api/v1/documents/{id}",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    request_body = UpdateDocumentRequest,
    responses(
        (status = 200, description = "Metadata updated", body = DocumentResponse),
        (status = 400, description = "Nothing to update", body = ErrorResponse),
        (status = 404, description = "Document not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    )
)]
pub async fn update_document(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateDocumentRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.documents.update_metadata(id, &tenant, request).await?;
    let details = state.documents.show(id, &tenant).await?;
    Ok(ApiResponse::ok(
        "Document updated",
        DocumentResponse::new(details.document, details.access),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/documents/{id}/download",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "File contents (local storage)", content_type = "application/octet-stream"),
        (status = 200, description = "Presigned download link (object storage)", body = DownloadLinkResponse),
        (status = 404, description = "Document not found", body = ErrorResponse),
        (status = 502, description = "Storage backend unavailable", body = ErrorResponse)
    )
)]
pub async fn download_document(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
    Path(id): Path<Uuid>,
) -> Result<Response, HttpAppError> {
    let result = state.documents.download(id, &tenant).await?;

    match result.download {
        Download::Redirect(access) => {
            tracing::debug!(document_id = %id, "Handing out presigned download link");
            let link = DownloadLinkResponse {
                download_url: access.url,
                expires_at: access.expires_at,
                storage_type: result.document.provider,
            };
            Ok(ApiResponse::ok("Download link generated", link).into_response())
        }
        Download::Stream { stream, size } => {
            let body = Body::from_stream(
                stream.map(|chunk| chunk.map_err(|e| std::io::Error::other(e.to_string()))),
            );
            let content_type = HeaderValue::from_str(&result.document.mime_type)
                .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

            let mut response = Response::new(body);
            let headers = response.headers_mut();
            headers.insert(header::CONTENT_TYPE, content_type);
            headers.insert(
                header::CONTENT_DISPOSITION,
                content_disposition(&result.document.original_name),
            );
            if let Some(size) = size {
                headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size));
            }
            Ok(response)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/documents/{id}/url",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Document ID"), UrlQuery),
    responses(
        (status = 200, description = "Access URL from the document's own location", body = AccessUrl),
        (status = 400, description = "Invalid expiry", body = ErrorResponse),
        (status = 404, description = "Document not found", body = ErrorResponse)
    )
)]
pub async fn get_document_url(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
    Path(id): Path<Uuid>,
    ValidatedQuery(query): ValidatedQuery<UrlQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let expires_in = match query.expires_in {
        Some(secs) if secs == 0 || secs > MAX_URL_EXPIRY_SECS => {
            return Err(AppError::InvalidInput(format!(
                "expires_in must be between 1 and {} seconds",
                MAX_URL_EXPIRY_SECS
            ))
            .into())
        }
        other => other.map(Duration::from_secs),
    };

    let access = state.documents.get_url(id, &tenant, expires_in).await?;
    Ok(ApiResponse::ok("Document URL generated", access))
}

#[utoipa::path(
    delete,
    path = "/api/v1/documents/{id}",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Stored object and record removed"),
        (status = 404, description = "Document not found", body = ErrorResponse),
        (status = 502, description = "Storage backend unavailable, record kept", body = ErrorResponse)
    )
)]
pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.documents.delete(id, &tenant).await?;
    Ok(ApiResponse::message("Document deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_strips_quotes_and_controls() {
        let value = content_disposition("pay\"slip\n.pdf");
        assert_eq!(value.to_str().unwrap(), "attachment; filename=\"pay'slip.pdf\"");
    }

    #[test]
    fn test_upload_form_requires_owner_type() {
        let form = UploadForm {
            file: Some(UploadFile {
                original_name: "a.pdf".to_string(),
                content_type: None,
                data: Bytes::from_static(b"a"),
            }),
            document_type_id: Some(Uuid::new_v4().to_string()),
            owner_id: Some(Uuid::new_v4().to_string()),
            ..Default::default()
        };
        assert!(matches!(form.into_request(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_upload_form_parses_owner() {
        let owner_id = Uuid::new_v4();
        let form = UploadForm {
            file: Some(UploadFile {
                original_name: "a.pdf".to_string(),
                content_type: None,
                data: Bytes::from_static(b"a"),
            }),
            document_type_id: Some(Uuid::new_v4().to_string()),
            owner_type: Some("Company".to_string()),
            owner_id: Some(owner_id.to_string()),
            display_name: Some("  ".to_string()),
        };
        let request = form.into_request().unwrap();
        assert_eq!(request.owner, Owner::new(OwnerKind::Company, owner_id));
        assert!(request.display_name.is_none());
    }
}
