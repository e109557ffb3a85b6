use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::tenant::TenantContext;
use crate::storage_types::ProviderKind;

/// A storage location: which provider holds the bytes for a tenant.
///
/// Documents keep a reference to the location they were written to. The
/// tenant's active location only decides where new uploads go.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Location {
    pub id: Uuid,
    pub provider: ProviderKind,
    pub organization_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Location {
    pub fn tenant(&self) -> TenantContext {
        TenantContext::new(self.organization_id, self.company_id)
    }

    pub fn is_global(&self) -> bool {
        self.organization_id.is_none() && self.company_id.is_none()
    }

    /// Whether this location is administered by the given tenant.
    pub fn belongs_to(&self, tenant: &TenantContext) -> bool {
        self.organization_id == tenant.organization_id && self.company_id == tenant.company_id
    }
}

/// Request body for creating a storage location
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateLocationRequest {
    pub provider: ProviderKind,
    /// Make this the tenant's active location right away.
    #[serde(default)]
    pub activate: bool,
}

/// Request body for switching a location's provider
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ChangeProviderRequest {
    pub provider: ProviderKind,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LocationResponse {
    pub id: Uuid,
    pub provider: ProviderKind,
    pub provider_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Location> for LocationResponse {
    fn from(location: Location) -> Self {
        LocationResponse {
            id: location.id,
            provider: location.provider,
            provider_label: location.provider.label().to_string(),
            organization_id: location.organization_id,
            company_id: location.company_id,
            is_active: location.is_active,
            created_at: location.created_at,
            updated_at: location.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(org: Option<Uuid>, company: Option<Uuid>) -> Location {
        Location {
            id: Uuid::new_v4(),
            provider: ProviderKind::Wasabi,
            organization_id: org,
            company_id: company,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_belongs_to_requires_exact_tenant() {
        let org = Uuid::new_v4();
        let loc = location(Some(org), None);
        assert!(loc.belongs_to(&TenantContext::organization(org)));
        assert!(!loc.belongs_to(&TenantContext::organization(Uuid::new_v4())));
        assert!(!loc.belongs_to(&TenantContext::global()));
        assert!(location(None, None).is_global());
    }

    #[test]
    fn test_location_response_carries_label() {
        let response = LocationResponse::from(location(None, Some(Uuid::new_v4())));
        assert_eq!(response.provider_label, "Wasabi");
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("organization_id").is_none());
    }

    #[test]
    fn test_create_location_rejects_unknown_fields() {
        let ok: CreateLocationRequest =
            serde_json::from_str(r#"{"provider":"aws"}"#).unwrap();
        assert_eq!(ok.provider, ProviderKind::Aws);
        assert!(!ok.activate);
        assert!(
            serde_json::from_str::<CreateLocationRequest>(r#"{"provider":"aws","bucket":"x"}"#)
                .is_err()
        );
    }
}
