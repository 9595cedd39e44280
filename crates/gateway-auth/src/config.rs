//! Client configuration.

use crate::AuthResult;
use gateway_config::{Config, DEFAULT_REFRESH_PATH, DEFAULT_REQUEST_TIMEOUT_SECS};
use std::time::Duration;
use url::Url;

/// Settings the client needs at runtime.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin request paths are resolved against.
    pub base_url: Url,
    /// Path of the refresh endpoint, relative to `base_url`.
    pub refresh_path: String,
    /// Network timeout for every request, refresh included.
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn from_config(config: &Config) -> AuthResult<Self> {
        config.validate()?;
        Ok(Self {
            base_url: config.api_base_url()?,
            refresh_path: config.refresh_path.clone(),
            request_timeout: config.request_timeout(),
        })
    }

    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
