use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Kinds of entity a document can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "owner_kind", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    Staff,
    Company,
    Organization,
}

impl Display for OwnerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            OwnerKind::Staff => write!(f, "staff"),
            OwnerKind::Company => write!(f, "company"),
            OwnerKind::Organization => write!(f, "organization"),
        }
    }
}

impl FromStr for OwnerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "staff" | "employee" => Ok(OwnerKind::Staff),
            "company" => Ok(OwnerKind::Company),
            "organization" | "organisation" => Ok(OwnerKind::Organization),
            _ => Err(anyhow::anyhow!("Invalid owner type: {}", s)),
        }
    }
}

/// The entity a document is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Owner {
    pub kind: OwnerKind,
    pub id: Uuid,
}

impl Owner {
    pub fn new(kind: OwnerKind, id: Uuid) -> Self {
        Self { kind, id }
    }

    pub fn staff(id: Uuid) -> Self {
        Self::new(OwnerKind::Staff, id)
    }
}
