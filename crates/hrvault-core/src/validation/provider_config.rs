//! Field validation for backend configurations
//!
//! Turns the loosely-typed request fields into a [`ProviderConfig`] of the given
//! kind. Fields that belong to another provider are a kind mismatch, missing or
//! malformed fields are reported per field.

use std::path::{Component, Path};

use crate::error::{AppError, FieldErrors};
use crate::models::{ConfigFields, LocalConfig, ObjectStoreConfig, ProviderConfig};
use crate::storage_types::ProviderKind;

/// Maximum length of any single config value
pub const MAX_CONFIG_FIELD_LENGTH: usize = 1024;

const LOCAL_ONLY_FIELDS: [&str; 2] = ["root_path", "base_url"];
const OBJECT_STORE_ONLY_FIELDS: [&str; 5] =
    ["bucket", "region", "access_key", "secret_key", "endpoint"];

/// Validate `fields` as a configuration of `kind`.
pub fn validate_provider_config(
    kind: ProviderKind,
    fields: &ConfigFields,
) -> Result<ProviderConfig, AppError> {
    let foreign: Vec<&str> = match kind {
        ProviderKind::Local => OBJECT_STORE_ONLY_FIELDS
            .iter()
            .copied()
            .filter(|name| field_value(fields, name).is_some())
            .collect(),
        ProviderKind::Wasabi | ProviderKind::Aws => LOCAL_ONLY_FIELDS
            .iter()
            .copied()
            .filter(|name| field_value(fields, name).is_some())
            .collect(),
    };
    if !foreign.is_empty() {
        return Err(AppError::InvalidConfigKind(format!(
            "{} configuration does not accept: {}",
            kind,
            foreign.join(", ")
        )));
    }

    let mut errors = FieldErrors::new();

    match kind {
        ProviderKind::Local => {
            let root_path = required(&mut errors, "root_path", fields.root_path.as_deref());
            if let Some(path) = root_path.as_deref() {
                if Path::new(path)
                    .components()
                    .any(|c| matches!(c, Component::ParentDir))
                {
                    errors.add("root_path", "root_path must not contain '..'");
                }
            }
            let base_url = optional(&mut errors, "base_url", fields.base_url.as_deref());
            if let Some(url) = base_url.as_deref() {
                check_http_url(&mut errors, "base_url", url);
            }

            errors.into_result()?;
            Ok(ProviderConfig::Local(LocalConfig {
                root_path: root_path.unwrap_or_default(),
                base_url,
            }))
        }
        ProviderKind::Wasabi | ProviderKind::Aws => {
            let bucket = required(&mut errors, "bucket", fields.bucket.as_deref());
            if let Some(name) = bucket.as_deref() {
                check_bucket_name(&mut errors, name);
            }
            let region = required(&mut errors, "region", fields.region.as_deref());
            let access_key = required(&mut errors, "access_key", fields.access_key.as_deref());
            let secret_key = required(&mut errors, "secret_key", fields.secret_key.as_deref());
            let endpoint = if kind == ProviderKind::Wasabi {
                required(&mut errors, "endpoint", fields.endpoint.as_deref())
            } else {
                optional(&mut errors, "endpoint", fields.endpoint.as_deref())
            };
            if let Some(url) = endpoint.as_deref() {
                check_http_url(&mut errors, "endpoint", url);
            }

            errors.into_result()?;
            let cfg = ObjectStoreConfig {
                bucket: bucket.unwrap_or_default(),
                region: region.unwrap_or_default(),
                access_key: access_key.unwrap_or_default(),
                secret_key: secret_key.unwrap_or_default(),
                endpoint,
            };
            Ok(if kind == ProviderKind::Wasabi {
                ProviderConfig::Wasabi(cfg)
            } else {
                ProviderConfig::Aws(cfg)
            })
        }
    }
}

fn field_value<'a>(fields: &'a ConfigFields, name: &str) -> Option<&'a str> {
    match name {
        "root_path" => fields.root_path.as_deref(),
        "base_url" => fields.base_url.as_deref(),
        "bucket" => fields.bucket.as_deref(),
        "region" => fields.region.as_deref(),
        "access_key" => fields.access_key.as_deref(),
        "secret_key" => fields.secret_key.as_deref(),
        "endpoint" => fields.endpoint.as_deref(),
        _ => None,
    }
}

fn required(errors: &mut FieldErrors, name: &str, value: Option<&str>) -> Option<String> {
    match value.map(str::trim) {
        None | Some("") => {
            errors.add(name, format!("{} is required", name));
            None
        }
        Some(v) => checked_length(errors, name, v),
    }
}

fn optional(errors: &mut FieldErrors, name: &str, value: Option<&str>) -> Option<String> {
    match value.map(str::trim) {
        None | Some("") => None,
        Some(v) => checked_length(errors, name, v),
    }
}

fn checked_length(errors: &mut FieldErrors, name: &str, value: &str) -> Option<String> {
    if value.len() > MAX_CONFIG_FIELD_LENGTH {
        errors.add(
            name,
            format!(
                "{} must be at most {} characters",
                name, MAX_CONFIG_FIELD_LENGTH
            ),
        );
        return None;
    }
    Some(value.to_string())
}

fn check_http_url(errors: &mut FieldErrors, name: &str, value: &str) {
    let lower = value.to_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !host.starts_with('/') => {}
        _ => errors.add(name, format!("{} must be an http(s) URL", name)),
    }
}

fn check_bucket_name(errors: &mut FieldErrors, name: &str) {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.');
    let valid_edges = name
        .chars()
        .next()
        .zip(name.chars().last())
        .is_some_and(|(first, last)| first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric());
    if !(3..=63).contains(&name.len()) || !valid_chars || !valid_edges {
        errors.add(
            "bucket",
            "bucket must be 3-63 lowercase letters, digits, dots or hyphens",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wasabi_fields() -> ConfigFields {
        ConfigFields {
            bucket: Some("hr-documents".to_string()),
            region: Some("eu-central-1".to_string()),
            access_key: Some("AKIAEXAMPLE".to_string()),
            secret_key: Some("secret".to_string()),
            endpoint: Some("https://s3.eu-central-1.wasabisys.com".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_local_config() {
        let fields = ConfigFields {
            root_path: Some(" /var/lib/hrvault ".to_string()),
            ..Default::default()
        };
        let cfg = validate_provider_config(ProviderKind::Local, &fields).unwrap();
        assert_eq!(
            cfg,
            ProviderConfig::Local(LocalConfig {
                root_path: "/var/lib/hrvault".to_string(),
                base_url: None,
            })
        );
    }

    #[test]
    fn test_local_requires_root_path() {
        let err = validate_provider_config(ProviderKind::Local, &ConfigFields::default())
            .unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(fields.get("root_path").is_some());
    }

    #[test]
    fn test_bucket_on_local_is_kind_mismatch() {
        let fields = ConfigFields {
            root_path: Some("/data".to_string()),
            bucket: Some("hr-documents".to_string()),
            ..Default::default()
        };
        let err = validate_provider_config(ProviderKind::Local, &fields).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfigKind(_)));
    }

    #[test]
    fn test_root_path_on_aws_is_kind_mismatch() {
        let mut fields = wasabi_fields();
        fields.root_path = Some("/data".to_string());
        let err = validate_provider_config(ProviderKind::Aws, &fields).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfigKind(_)));
    }

    #[test]
    fn test_wasabi_requires_endpoint_but_aws_does_not() {
        let mut fields = wasabi_fields();
        fields.endpoint = None;

        let err = validate_provider_config(ProviderKind::Wasabi, &fields).unwrap_err();
        assert_eq!(
            err.field_errors().unwrap().fields().collect::<Vec<_>>(),
            vec!["endpoint"]
        );

        let cfg = validate_provider_config(ProviderKind::Aws, &fields).unwrap();
        assert_eq!(cfg.kind(), ProviderKind::Aws);
        assert!(cfg.object_store().unwrap().endpoint.is_none());
    }

    #[test]
    fn test_object_store_reports_every_missing_field() {
        let err = validate_provider_config(ProviderKind::Wasabi, &ConfigFields::default())
            .unwrap_err();
        let names: Vec<&str> = err.field_errors().unwrap().fields().collect();
        assert_eq!(
            names,
            vec!["access_key", "bucket", "endpoint", "region", "secret_key"]
        );
    }

    #[test]
    fn test_malformed_values() {
        let mut fields = wasabi_fields();
        fields.bucket = Some("Bad_Bucket".to_string());
        fields.endpoint = Some("s3.wasabisys.com".to_string());
        let err = validate_provider_config(ProviderKind::Wasabi, &fields).unwrap_err();
        let names: Vec<&str> = err.field_errors().unwrap().fields().collect();
        assert_eq!(names, vec!["bucket", "endpoint"]);
    }

    #[test]
    fn test_parent_dir_in_root_path_rejected() {
        let fields = ConfigFields {
            root_path: Some("/data/../etc".to_string()),
            ..Default::default()
        };
        assert!(validate_provider_config(ProviderKind::Local, &fields).is_err());
    }
}
