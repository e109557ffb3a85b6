//! Storage location administration.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::extract::Tenant;
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use hrvault_core::models::{ChangeProviderRequest, CreateLocationRequest, LocationResponse};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/v1/locations",
    tag = "locations",
    request_body = CreateLocationRequest,
    responses(
        (status = 201, description = "Location created", body = LocationResponse),
        (status = 400, description = "Invalid input or ambiguous tenant", body = ErrorResponse)
    )
)]
pub async fn create_location(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
    ValidatedJson(request): ValidatedJson<CreateLocationRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let location = state
        .locations
        .create_location(&tenant, request.provider, request.activate)
        .await?;
    Ok(ApiResponse::created(
        "Location created",
        LocationResponse::from(location),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/locations",
    tag = "locations",
    responses(
        (status = 200, description = "Locations owned by the caller", body = [LocationResponse]),
        (status = 400, description = "Ambiguous tenant", body = ErrorResponse)
    )
)]
pub async fn list_locations(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
) -> Result<impl IntoResponse, HttpAppError> {
    let locations: Vec<LocationResponse> = state
        .locations
        .list_locations(&tenant)
        .await?
        .into_iter()
        .map(LocationResponse::from)
        .collect();
    Ok(ApiResponse::ok("Locations retrieved", locations))
}

/// The location new uploads from this caller would land on.
#[utoipa::path(
    get,
    path = "/api/v1/locations/active",
    tag = "locations",
    responses(
        (status = 200, description = "Active location for the caller", body = LocationResponse),
        (status = 400, description = "Ambiguous tenant", body = ErrorResponse),
        (status = 404, description = "No active location", body = ErrorResponse)
    )
)]
pub async fn get_active_location(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
) -> Result<impl IntoResponse, HttpAppError> {
    let location = state.locations.resolve_active_location(&tenant).await?;
    Ok(ApiResponse::ok(
        "Active location retrieved",
        LocationResponse::from(location),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/locations/{id}",
    tag = "locations",
    params(("id" = Uuid, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Location", body = LocationResponse),
        (status = 404, description = "Location not found", body = ErrorResponse)
    )
)]
pub async fn get_location(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let location = state.locations.get_location(&tenant, id).await?;
    Ok(ApiResponse::ok(
        "Location retrieved",
        LocationResponse::from(location),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/locations/{id}/activate",
    tag = "locations",
    params(("id" = Uuid, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Location is now the only active one for its owner", body = LocationResponse),
        (status = 404, description = "Location not found", body = ErrorResponse)
    )
)]
pub async fn activate_location(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.locations.set_active_location(&tenant, id).await?;
    let location = state.locations.get_location(&tenant, id).await?;
    Ok(ApiResponse::ok(
        "Location activated",
        LocationResponse::from(location),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/locations/{id}/provider",
    tag = "locations",
    params(("id" = Uuid, Path, description = "Location ID")),
    request_body = ChangeProviderRequest,
    responses(
        (status = 200, description = "Provider changed, backend config cleared", body = LocationResponse),
        (status = 404, description = "Location not found", body = ErrorResponse),
        (status = 409, description = "Location already holds documents", body = ErrorResponse)
    )
)]
pub async fn change_location_provider(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<ChangeProviderRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let location = state
        .locations
        .change_provider(&tenant, id, request.provider)
        .await?;
    Ok(ApiResponse::ok(
        "Location provider changed",
        LocationResponse::from(location),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/locations/{id}",
    tag = "locations",
    params(("id" = Uuid, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Location and its config removed"),
        (status = 404, description = "Location not found", body = ErrorResponse),
        (status = 409, description = "Location is active or holds documents", body = ErrorResponse)
    )
)]
pub async fn delete_location(
    State(state): State<Arc<AppState>>,
    Tenant(tenant): Tenant,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.locations.delete_location(&tenant, id).await?;
    Ok(ApiResponse::message("Location deleted"))
}
