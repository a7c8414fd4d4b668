//! Configuration management for the civic intel dashboard
//!
//! Supports loading configuration from:
//! - TOML/YAML files under a config directory
//! - Environment variables (CIVIC_INTEL__ prefix)

pub mod settings;

pub use settings::{
    load_settings, load_settings_from, ObservabilityConfig, ServerConfig, Settings,
    StorageConfig, WorkflowConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    fn invalid(field: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
