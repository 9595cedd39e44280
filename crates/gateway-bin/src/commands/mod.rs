//! CLI command implementations.

mod auth;
mod config;
mod request;

pub use auth::{login, logout, status};
pub use config::show_config;
pub use request::request;

use crate::output::OutputFormat;
use anyhow::Result;
use gateway_auth::{AuthenticatedClient, ClientConfig, CredentialStore};
use gateway_config::{Config, Paths};
use std::sync::Arc;

/// Everything a command needs, resolved once at startup.
pub struct Context {
    pub paths: Paths,
    pub config: Config,
    pub format: OutputFormat,
}

impl Context {
    pub fn new(paths: Paths, config: Config, format: OutputFormat) -> Self {
        Self {
            paths,
            config,
            format,
        }
    }

    /// Credential store backed by the credentials file.
    pub fn store(&self) -> Result<Arc<CredentialStore>> {
        let store = gateway_storage::create_credential_store(&self.paths.credentials_file())?;
        Ok(Arc::new(store))
    }

    /// Authenticated client over HTTP.
    pub fn client(&self) -> Result<AuthenticatedClient> {
        let config = ClientConfig::from_config(&self.config)?;
        Ok(AuthenticatedClient::new(&config, self.store()?)?)
    }
}

#[cfg(test)]
pub(crate) fn test_context(base: &std::path::Path) -> Context {
    let paths = Paths::with_base_dir(base.to_path_buf());
    paths.ensure_dirs().unwrap();
    Context::new(paths, Config::default(), OutputFormat::Text)
}
