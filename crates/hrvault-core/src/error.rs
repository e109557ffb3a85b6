//! Error types module
//!
//! All failures surfaced by the storage core are unified under [`AppError`]. Each
//! variant describes its own HTTP status, machine-readable code, retry hint and log
//! level through [`ErrorMetadata`], so transport adapters never need to inspect
//! error text.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "DOCUMENT_NOT_FOUND")
    fn error_code(&self) -> &'static str;

    /// Whether the caller may retry the whole operation
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Field-level validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded, otherwise `AppError::ValidationFailed`.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::ValidationFailed(self))
        }
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(FieldErrors),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Storage configuration not found: {0}")]
    ConfigNotFound(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Ambiguous tenant reference: {0}")]
    AmbiguousTenantReference(String),

    #[error("Invalid configuration kind: {0}")]
    InvalidConfigKind(String),

    #[error("Location in use: {0}")]
    LocationInUse(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, errors) in err.field_errors() {
            for error in errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid ({})", field, error.code));
                fields.add(field.to_string(), message);
            }
        }
        AppError::ValidationFailed(fields)
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::ValidationFailed(_) => (
            422,
            "VALIDATION_FAILED",
            false,
            Some("Correct the listed fields and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::LocationNotFound(_) => (
            404,
            "LOCATION_NOT_FOUND",
            false,
            Some("Verify the storage location ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::DocumentNotFound(_) => (
            404,
            "DOCUMENT_NOT_FOUND",
            false,
            Some("Verify the document ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::ConfigNotFound(_) => (
            404,
            "STORAGE_CONFIG_NOT_FOUND",
            false,
            Some("Configure the storage backend for this location"),
            false,
            LogLevel::Warn,
        ),
        AppError::StorageUnavailable(_) => (
            502,
            "STORAGE_UNAVAILABLE",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::AmbiguousTenantReference(_) => (
            400,
            "AMBIGUOUS_TENANT_REFERENCE",
            false,
            Some("Send either an organization or a company reference"),
            false,
            LogLevel::Warn,
        ),
        AppError::InvalidConfigKind(_) => (
            400,
            "INVALID_CONFIG_KIND",
            false,
            Some("Use the configuration kind matching the location provider"),
            false,
            LogLevel::Warn,
        ),
        AppError::LocationInUse(_) => (
            409,
            "LOCATION_IN_USE",
            false,
            Some("Create a new location and activate it instead"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::ValidationFailed(_) => "ValidationFailed",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::LocationNotFound(_) => "LocationNotFound",
            AppError::DocumentNotFound(_) => "DocumentNotFound",
            AppError::ConfigNotFound(_) => "ConfigNotFound",
            AppError::StorageUnavailable(_) => "StorageUnavailable",
            AppError::AmbiguousTenantReference(_) => "AmbiguousTenantReference",
            AppError::InvalidConfigKind(_) => "InvalidConfigKind",
            AppError::LocationInUse(_) => "LocationInUse",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Field-level messages, present only for validation failures.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AppError::ValidationFailed(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::LocationNotFound(_)
                | AppError::DocumentNotFound(_)
                | AppError::ConfigNotFound(_)
        )
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::ValidationFailed(_) => "The given data was invalid".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::LocationNotFound(_) => "Storage location not found".to_string(),
            AppError::DocumentNotFound(_) => "Document not found".to_string(),
            AppError::ConfigNotFound(_) => {
                "Storage backend is not configured for this location".to_string()
            }
            AppError::StorageUnavailable(_) => "Storage backend is unavailable".to_string(),
            AppError::AmbiguousTenantReference(ref msg) => msg.clone(),
            AppError::InvalidConfigKind(ref msg) => msg.clone(),
            AppError::LocationInUse(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}
