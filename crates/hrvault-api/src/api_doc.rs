//! OpenAPI documentation, served at `/api/openapi.json` and browsable at `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use hrvault_core::models;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Vault Document Storage API",
        version = "0.1.0",
        description = "Tenant-scoped document storage over local disk, Wasabi and AWS S3. Tenant context is passed by the gateway in the X-Organization-Id and X-Company-Id headers. All endpoints are versioned under /api/v1/."
    ),
    paths(
        // Documents
        handlers::documents::upload_document,
        handlers::documents::list_documents,
        handlers::documents::get_document,
        handlers::documents::update_document,
        handlers::documents::download_document,
        handlers::documents::get_document_url,
        handlers::documents::delete_document,
        // Locations
        handlers::locations::create_location,
        handlers::locations::list_locations,
        handlers::locations::get_active_location,
        handlers::locations::get_location,
        handlers::locations::activate_location,
        handlers::locations::change_location_provider,
        handlers::locations::delete_location,
        // Config
        handlers::config::put_config,
        handlers::config::get_config,
        // Health
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::DocumentResponse,
            models::UpdateDocumentRequest,
            models::AccessUrl,
            models::FileInfo,
            models::Owner,
            models::OwnerKind,
            models::LocationResponse,
            models::CreateLocationRequest,
            models::ChangeProviderRequest,
            models::ConfigFields,
            models::StorageConfigResponse,
            hrvault_core::ProviderKind,
            hrvault_core::UrlType,
            handlers::documents::DocumentListQuery,
            handlers::documents::DocumentDetailsResponse,
            handlers::documents::DownloadLinkResponse,
            handlers::health::HealthResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "documents", description = "Upload, list, download and delete tenant documents"),
        (name = "locations", description = "Storage location administration"),
        (name = "config", description = "Backend configuration per storage location"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
