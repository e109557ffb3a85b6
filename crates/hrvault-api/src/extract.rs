//! Tenant context from the gateway headers.
//!
//! Authentication happens upstream. The gateway forwards the caller's
//! organization and/or company as `X-Organization-Id` / `X-Company-Id`;
//! absent headers mean the global scope. Ambiguity is decided by the services,
//! not here, since it depends on what each tenant has configured.

use crate::error::HttpAppError;
use axum::{extract::FromRequestParts, http::request::Parts};
use hrvault_core::models::TenantContext;
use hrvault_core::AppError;
use uuid::Uuid;

pub const ORGANIZATION_HEADER: &str = "x-organization-id";
pub const COMPANY_HEADER: &str = "x-company-id";

#[derive(Debug, Clone, Copy)]
pub struct Tenant(pub TenantContext);

fn header_uuid(parts: &Parts, name: &str) -> Result<Option<Uuid>, AppError> {
    let Some(value) = parts.headers.get(name) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| AppError::InvalidInput(format!("{} header is not valid text", name)))?
        .trim();
    if value.is_empty() {
        return Ok(None);
    }
    Uuid::parse_str(value)
        .map(Some)
        .map_err(|_| AppError::InvalidInput(format!("{} header must be a UUID", name)))
}

impl<S> FromRequestParts<S> for Tenant
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let organization_id = header_uuid(parts, ORGANIZATION_HEADER)?;
        let company_id = header_uuid(parts, COMPANY_HEADER)?;
        Ok(Tenant(TenantContext::new(organization_id, company_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(headers: &[(&str, &str)]) -> Result<TenantContext, HttpAppError> {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Tenant::from_request_parts(&mut parts, &())
            .await
            .map(|Tenant(ctx)| ctx)
    }

    #[tokio::test]
    async fn test_no_headers_is_global() {
        assert!(extract(&[]).await.unwrap().is_global());
    }

    #[tokio::test]
    async fn test_both_headers_are_kept() {
        let org = Uuid::new_v4();
        let company = Uuid::new_v4();
        let ctx = extract(&[
            ("X-Organization-Id", &org.to_string()),
            ("X-Company-Id", &company.to_string()),
        ])
        .await
        .unwrap();
        assert_eq!(ctx.organization_id, Some(org));
        assert_eq!(ctx.company_id, Some(company));
    }

    #[tokio::test]
    async fn test_invalid_uuid_is_rejected() {
        let err = extract(&[("X-Company-Id", "acme")]).await.unwrap_err();
        assert!(matches!(err.0, AppError::InvalidInput(_)));
    }
}
