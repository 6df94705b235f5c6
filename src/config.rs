//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `VISITLOG_*` environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::identity::IdentityClientConfig;
use crate::session::SessionConfig;
use crate::tracker::TrackerConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub identity: IdentityConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Identity / document backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_identity_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub project_id: String,

    #[serde(default)]
    pub database_id: String,

    #[serde(default)]
    pub scripts_collection_id: String,

    #[serde(default = "default_oauth_provider")]
    pub oauth_provider: String,

    /// Page linked from recovery emails; defaults to `{public_origin}/login`
    #[serde(default)]
    pub recovery_url: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_identity_endpoint() -> String {
    "https://cloud.appwrite.io/v1".to_string()
}

fn default_oauth_provider() -> String {
    "google".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            endpoint: default_identity_endpoint(),
            project_id: String::new(),
            database_id: String::new(),
            scripts_collection_id: String::new(),
            oauth_provider: default_oauth_provider(),
            recovery_url: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Analytics backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_analytics_url")]
    pub base_url: String,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_analytics_url() -> String {
    "https://visitloggerbackend.vercel.app".to_string()
}

fn default_page_size() -> u32 {
    10
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            base_url: default_analytics_url(),
            page_size: default_page_size(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Web front-end configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origin browsers use to reach the server; defaults to the bind address
    #[serde(default)]
    pub public_origin: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8085
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_origin: None,
        }
    }
}

impl ServerConfig {
    pub fn public_origin(&self) -> String {
        match &self.public_origin {
            Some(origin) if !origin.trim().is_empty() => origin.trim_end_matches('/').to_string(),
            _ => {
                let host = match self.host.as_str() {
                    "0.0.0.0" | "::" => "localhost",
                    host => host,
                };
                format!("http://{}:{}", host, self.port)
            }
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("visitlog").join("config.toml")),
            Some(PathBuf::from("/etc/visitlog/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Refuse to start without the identity backend coordinates
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.identity.endpoint.trim().is_empty() {
            return Err(ConfigError::Missing("identity.endpoint"));
        }
        if self.identity.project_id.trim().is_empty() {
            return Err(ConfigError::Missing("identity.project_id"));
        }
        if self.analytics.page_size == 0 {
            return Err(ConfigError::Invalid {
                field: "analytics.page_size",
                error: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Identity client settings
    pub fn identity_client(&self) -> IdentityClientConfig {
        IdentityClientConfig {
            endpoint: self.identity.endpoint.clone(),
            project_id: self.identity.project_id.clone(),
            request_timeout_ms: self.identity.request_timeout_secs * 1000,
        }
    }

    /// Analytics client settings
    pub fn tracker_client(&self) -> TrackerConfig {
        TrackerConfig {
            base_url: self.analytics.base_url.clone(),
            request_timeout_ms: self.analytics.request_timeout_secs * 1000,
        }
    }

    /// Session store settings
    pub fn session(&self) -> SessionConfig {
        let public_origin = self.server.public_origin();
        SessionConfig {
            oauth_provider: self.identity.oauth_provider.clone(),
            recovery_url: self
                .identity
                .recovery_url
                .clone()
                .unwrap_or_else(|| format!("{}/login", public_origin)),
            public_origin,
        }
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Identity overrides
        if let Some(endpoint) = var("VISITLOG_IDENTITY_ENDPOINT") {
            self.identity.endpoint = endpoint;
        }
        if let Some(project_id) = var("VISITLOG_PROJECT_ID") {
            self.identity.project_id = project_id;
        }
        if let Some(database_id) = var("VISITLOG_DATABASE_ID") {
            self.identity.database_id = database_id;
        }
        if let Some(collection_id) = var("VISITLOG_SCRIPTS_COLLECTION_ID") {
            self.identity.scripts_collection_id = collection_id;
        }

        // Analytics overrides
        if let Some(url) = var("VISITLOG_ANALYTICS_URL") {
            self.analytics.base_url = url;
        }

        // Server overrides
        if let Some(host) = var("VISITLOG_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("VISITLOG_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Some(origin) = var("VISITLOG_PUBLIC_ORIGIN") {
            self.server.public_origin = Some(origin);
        }

        // Logging overrides
        if let Some(level) = var("VISITLOG_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("VISITLOG_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid setting {field}: {error}")]
    Invalid { field: &'static str, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Visit Logger Configuration
#
# Environment variables override these settings:
# - VISITLOG_IDENTITY_ENDPOINT
# - VISITLOG_PROJECT_ID
# - VISITLOG_DATABASE_ID
# - VISITLOG_SCRIPTS_COLLECTION_ID
# - VISITLOG_ANALYTICS_URL
# - VISITLOG_HOST
# - VISITLOG_PORT
# - VISITLOG_PUBLIC_ORIGIN
# - VISITLOG_LOG_LEVEL
# - VISITLOG_LOG_FORMAT

[identity]
# Identity backend API endpoint (required)
endpoint = "https://cloud.appwrite.io/v1"

# Identity backend project id (required)
project_id = ""

# Database and collection holding script documents
database_id = ""
scripts_collection_id = ""

# OAuth provider used by "Continue with Google"
oauth_provider = "google"

# Page linked from password recovery emails
# recovery_url = "http://localhost:8085/login"

# Request timeout in seconds
request_timeout_secs = 10

[analytics]
# Analytics backend base URL
base_url = "https://visitloggerbackend.vercel.app"

# Rows per analytics page
page_size = 10

# Request timeout in seconds
request_timeout_secs = 10

[server]
# Web front-end host
host = "127.0.0.1"

# Web front-end port
port = 8085

# Origin browsers use to reach the front-end (OAuth redirects land here)
# public_origin = "http://localhost:8085"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
