//! Validation modules

pub mod provider_config;

pub use provider_config::{validate_provider_config, MAX_CONFIG_FIELD_LENGTH};
