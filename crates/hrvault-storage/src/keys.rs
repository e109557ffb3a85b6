//! Shared key generation for storage drivers.
//!
//! Key format: `{tenant}/{owner_kind}/{owner_id}/{document_type_id}/{timestamp}-{random}-{filename}`.

use chrono::{DateTime, Utc};
use hrvault_core::models::{Owner, TenantContext};
use uuid::Uuid;

use crate::traits::{StorageError, StorageResult};

const MAX_FILENAME_LENGTH: usize = 100;
const RANDOM_SUFFIX_LENGTH: usize = 8;

/// Generate the storage key for a new document.
///
/// The timestamp and random suffix make concurrent uploads of the same file
/// land on different keys.
pub fn generate_document_key(
    tenant: &TenantContext,
    owner: &Owner,
    document_type_id: Uuid,
    original_name: &str,
    now: DateTime<Utc>,
) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{}/{}/{}/{}/{}-{}-{}",
        tenant.key_segment(),
        owner.kind,
        owner.id,
        document_type_id,
        now.format("%Y%m%d%H%M%S%3f"),
        &random[..RANDOM_SUFFIX_LENGTH],
        sanitize_filename(original_name)
    )
}

/// Reduce a client-supplied filename to a safe final key segment.
///
/// Directory parts are dropped, characters outside `[A-Za-z0-9._-]` become
/// `_`, leading dots are stripped and the result is capped in length.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(&['/', '\\'][..]).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    let cleaned = if cleaned.len() > MAX_FILENAME_LENGTH {
        // keep the extension when truncating
        match cleaned.rfind('.') {
            Some(dot) if cleaned.len() - dot <= 10 => {
                let ext = &cleaned[dot..];
                format!("{}{}", &cleaned[..MAX_FILENAME_LENGTH - ext.len()], ext)
            }
            _ => cleaned[..MAX_FILENAME_LENGTH].to_string(),
        }
    } else {
        cleaned.to_string()
    };

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        "file".to_string()
    } else {
        cleaned
    }
}

/// Reject keys that could address something outside the storage root.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if key.starts_with('/') || key.contains('\\') || key.contains('\0') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    if key.split('/').any(|segment| segment == ".." || segment == "." || segment.is_empty()) {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid path segments".to_string(),
        ));
    }
    Ok(())
}
