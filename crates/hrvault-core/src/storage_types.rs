use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use utoipa::ToSchema;

/// Storage provider kinds
///
/// A location stores its bytes in exactly one of these. Wasabi and AWS share the
/// S3 protocol and differ only in endpoint and credentials.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, ToSchema,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "provider_kind", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Local,
    Wasabi,
    Aws,
}

impl ProviderKind {
    /// Human-readable label shown in the admin UI.
    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::Local => "Local",
            ProviderKind::Wasabi => "Wasabi",
            ProviderKind::Aws => "AWS S3",
        }
    }

    pub fn is_object_store(&self) -> bool {
        matches!(self, ProviderKind::Wasabi | ProviderKind::Aws)
    }
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(ProviderKind::Local),
            "wasabi" => Ok(ProviderKind::Wasabi),
            "aws" | "s3" => Ok(ProviderKind::Aws),
            _ => Err(anyhow::anyhow!("Invalid storage provider: {}", s)),
        }
    }
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ProviderKind::Local => write!(f, "local"),
            ProviderKind::Wasabi => write!(f, "wasabi"),
            ProviderKind::Aws => write!(f, "aws"),
        }
    }
}

/// Whether an access URL can be cached and shared indefinitely or expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UrlType {
    Permanent,
    Temporary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_round_trips_through_strings() {
        for kind in [ProviderKind::Local, ProviderKind::Wasabi, ProviderKind::Aws] {
            assert_eq!(kind.to_string().parse::<ProviderKind>().unwrap(), kind);
        }
        assert_eq!("S3".parse::<ProviderKind>().unwrap(), ProviderKind::Aws);
        assert!("ftp".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_provider_labels() {
        assert_eq!(ProviderKind::Local.label(), "Local");
        assert_eq!(ProviderKind::Wasabi.label(), "Wasabi");
        assert_eq!(ProviderKind::Aws.label(), "AWS S3");
        assert!(!ProviderKind::Local.is_object_store());
        assert!(ProviderKind::Wasabi.is_object_store());
    }

    #[test]
    fn test_url_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(UrlType::Temporary).unwrap(),
            serde_json::json!("temporary")
        );
    }
}
