//! Configuration management

use crate::error::{CampusError, CampusResult};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/";

/// Console configuration, loaded from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CampusConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Every request path is resolved against this address
    pub base_url: String,
    /// Request timeout; unset means requests may wait indefinitely
    pub timeout_seconds: Option<u64>,
    /// Treat any successful response carrying a `token` as a login,
    /// not only requests declared as authentication requests
    pub capture_auth_from_any_response: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: None,
            capture_auth_from_any_response: false,
        }
    }
}

/// Where the session (token, role, identifiers) is persisted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Session file; defaults to `<config dir>/campus/session.json`
    pub path: Option<PathBuf>,
}

impl CampusConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> CampusResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CampusError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: CampusConfig = toml::from_str(&content).map_err(|e| CampusError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> CampusResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| CampusError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content).map_err(|e| CampusError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> CampusResult<()> {
        let url = url::Url::parse(&self.api.base_url).map_err(|e| CampusError::Config {
            message: format!("Invalid api.base_url '{}': {}", self.api.base_url, e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("validate")
                .with_suggestion("Use an absolute URL such as http://127.0.0.1:8000/api/"),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(crate::config_error!(
                format!("api.base_url must use http or https, got '{}'", url.scheme()),
                "config"
            ));
        }

        if self.api.timeout_seconds == Some(0) {
            return Err(crate::config_error!(
                "api.timeout_seconds must be greater than 0 when set",
                "config"
            ));
        }

        Ok(())
    }
}
