use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// The tenant a request acts on behalf of.
///
/// Either reference may be absent. With neither set the request targets the
/// global scope, which routes uploads to the system default location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct TenantContext {
    pub organization_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
}

impl TenantContext {
    pub fn global() -> Self {
        Self::default()
    }

    pub fn organization(id: Uuid) -> Self {
        Self {
            organization_id: Some(id),
            company_id: None,
        }
    }

    pub fn company(id: Uuid) -> Self {
        Self {
            organization_id: None,
            company_id: Some(id),
        }
    }

    pub fn new(organization_id: Option<Uuid>, company_id: Option<Uuid>) -> Self {
        Self {
            organization_id,
            company_id,
        }
    }

    pub fn is_global(&self) -> bool {
        self.organization_id.is_none() && self.company_id.is_none()
    }

    /// First segment of every storage key written for this tenant.
    pub fn key_segment(&self) -> String {
        match (self.organization_id, self.company_id) {
            (Some(org), _) => format!("org-{}", org),
            (None, Some(company)) => format!("company-{}", company),
            (None, None) => "global".to_string(),
        }
    }
}
