//! Configuration management.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default API origin (can be overridden at compile time via AUTHGATE_DEFAULT_API_URL).
pub const DEFAULT_API_BASE_URL: &str = match option_env!("AUTHGATE_DEFAULT_API_URL") {
    Some(url) => url,
    None => "http://localhost:8080",
};

/// Default refresh endpoint path (can be overridden at compile time via AUTHGATE_DEFAULT_REFRESH_PATH).
pub const DEFAULT_REFRESH_PATH: &str = match option_env!("AUTHGATE_DEFAULT_REFRESH_PATH") {
    Some(path) => path,
    None => "/auth/refresh",
};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Network timeout applied to every request, the refresh call included.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Origin that request paths are resolved against.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Path of the credential refresh endpoint.
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    /// Per-request network timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_refresh_path() -> String {
    DEFAULT_REFRESH_PATH.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api_base_url: default_api_base_url(),
            refresh_path: default_refresh_path(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Defaults, then environment overrides.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load configuration from the config file (if any), then apply
    /// environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    fn load_from_env(&mut self) {
        if let Some(level) = non_empty_env("AUTHGATE_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(url) = non_empty_env("AUTHGATE_API_URL") {
            self.api_base_url = url;
        }
        if let Some(path) = non_empty_env("AUTHGATE_REFRESH_PATH") {
            self.refresh_path = path;
        }
        if let Some(raw) = non_empty_env("AUTHGATE_REQUEST_TIMEOUT_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) => self.request_timeout_secs = secs,
                Err(_) => tracing::warn!(
                    value = %raw,
                    "Ignoring invalid AUTHGATE_REQUEST_TIMEOUT_SECS"
                ),
            }
        }
    }

    /// Reject values the client cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        self.api_base_url()?;
        if self.refresh_path.trim().is_empty() {
            return Err(CoreError::Config("refresh_path must not be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the API origin as a parsed URL.
    pub fn api_base_url(&self) -> CoreResult<Url> {
        Url::parse(&self.api_base_url).map_err(CoreError::from)
    }

    /// Per-request network timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}
