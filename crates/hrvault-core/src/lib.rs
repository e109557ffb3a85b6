//! HR Vault Core Library
//!
//! This crate provides the domain models, error types, configuration, and validation
//! shared by every HR Vault component: storage drivers, repositories, services and the API.

pub mod config;
pub mod constants;
pub mod encryption;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use encryption::EncryptionService;
pub use error::{AppError, ErrorMetadata, FieldErrors, LogLevel};
pub use storage_types::{ProviderKind, UrlType};
