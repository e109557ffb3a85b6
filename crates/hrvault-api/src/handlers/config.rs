//! Per-location backend configuration.
//!
//! Secrets are accepted in full on write and only ever returned masked.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::extract::Tenant;
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use hrvault_core::models::{ConfigFields, StorageConfigResponse};
use hrvault_core::ProviderKind;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    put,
    path = "/api/v1/locations/{id}/config/{kind}",
    tag = "config",
    params(
        ("id" = Uuid, Path, description = "Location ID"),
        ("kind" = ProviderKind, Path, description = "Backend kind: local, wasabi or aws")
    ),
    request_body = ConfigFields,
    responses(
        (status = 200, description = "Configuration stored", body = StorageConfigResponse),
        (status = 400, description = "Kind does not match the location provider", body = ErrorResponse),
        (status = 404, description = "Location not found", body = ErrorResponse),
        (status = 422, description = "Missing or invalid fields", body = ErrorResponse)
    )
)]
pub async fn put_config(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
    Path((id, kind)): Path<(Uuid, ProviderKind)>,
    ValidatedJson(fields): ValidatedJson<ConfigFields>,
) -> Result<impl IntoResponse, HttpAppError> {
    let config = state.configs.put_config(&tenant, id, kind, &fields).await?;
    Ok(ApiResponse::ok(
        "Storage configuration saved",
        StorageConfigResponse::from(&config),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/locations/{id}/config",
    tag = "config",
    params(("id" = Uuid, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Configuration with the secret masked", body = StorageConfigResponse),
        (status = 404, description = "Location or configuration not found", body = ErrorResponse)
    )
)]
pub async fn get_config(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let view = state.configs.view_config(&tenant, id).await?;
    Ok(ApiResponse::ok("Storage configuration retrieved", view))
}
