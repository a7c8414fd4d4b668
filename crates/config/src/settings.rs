//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Document store configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// External ingestion workflow
    #[serde(default)]
    pub workflow: WorkflowConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::invalid("server.port", "port must be non-zero"));
        }

        let uri = &self.storage.uri;
        if !(uri.starts_with("mongodb://") || uri.starts_with("mongodb+srv://")) {
            return Err(ConfigError::invalid(
                "storage.uri",
                format!("expected a mongodb:// or mongodb+srv:// URI, got '{}'", uri),
            ));
        }

        if self.storage.database.trim().is_empty() {
            return Err(ConfigError::invalid("storage.database", "must not be empty"));
        }

        if self.storage.collection.trim().is_empty() {
            return Err(ConfigError::invalid("storage.collection", "must not be empty"));
        }

        if let Some(url) = &self.workflow.webhook_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::invalid(
                    "workflow.webhook_url",
                    format!("expected an http(s) URL, got '{}'", url),
                ));
            }
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins (any origin when empty)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5001
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: default_true(),
            cors_origins: Vec::new(),
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// MongoDB connection string
    #[serde(default = "default_storage_uri")]
    pub uri: String,

    /// Database name
    #[serde(default = "default_database")]
    pub database: String,

    /// Collection holding voicemail documents
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Application name reported to the server
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Connect and server selection timeout
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_storage_uri() -> String {
    "mongodb://localhost:27017".to_string()
}
fn default_database() -> String {
    "civicIntel".to_string()
}
fn default_collection() -> String {
    "voicemails".to_string()
}
fn default_app_name() -> String {
    "civic-intel".to_string()
}
fn default_connect_timeout_ms() -> u64 {
    5000
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uri: default_storage_uri(),
            database: default_database(),
            collection: default_collection(),
            app_name: default_app_name(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

/// External automation workflow that ingests new voicemails
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Webhook that starts the workflow (set via CIVIC_INTEL__WORKFLOW__WEBHOOK_URL)
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_workflow_timeout")]
    pub timeout_seconds: u64,

    /// Wait before re-reading storage after a successful trigger
    #[serde(default = "default_refresh_delay_ms")]
    pub refresh_delay_ms: u64,
}

fn default_workflow_timeout() -> u64 {
    30
}
fn default_refresh_delay_ms() -> u64 {
    500
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_seconds: default_workflow_timeout(),
            refresh_delay_ms: default_refresh_delay_ms(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Serve Prometheus metrics at /metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from `config/` and the environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (CIVIC_INTEL__ prefix)
/// 2. config/{env}.toml|yaml (if env specified)
/// 3. config/default.toml|yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings with files resolved against `dir`
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(
        File::with_name(&dir.join("default").to_string_lossy())
            .required(false)
    );

    if let Some(env_name) = env {
        builder = builder.add_source(
            File::with_name(&dir.join(env_name).to_string_lossy())
                .required(false)
        );
    }

    builder = builder.add_source(
        Environment::with_prefix("CIVIC_INTEL")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
