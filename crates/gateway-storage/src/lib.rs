//! Credential storage for authgate.
//!
//! Backends implement [`SecureStorage`]:
//! - [`FileStorage`]: JSON file under `~/.authgate`, replaced atomically on every write
//! - [`MemoryStorage`]: in-process, for tests and ephemeral sessions
//!
//! [`CredentialStore`] layers pair semantics on top of a backend.

mod credentials;
mod file;
mod keys;
mod memory;
mod traits;

pub use credentials::{CredentialPair, CredentialStore};
pub use file::FileStorage;
pub use keys::StorageKeys;
pub use memory::MemoryStorage;
pub use traits::SecureStorage;

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend-specific failure
    #[error("Platform storage error: {0}")]
    Platform(String),

    /// Key not found
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Create the default durable storage at `path`.
pub fn create_storage(path: &Path) -> StorageResult<Arc<dyn SecureStorage>> {
    let storage = FileStorage::new(path)?;
    Ok(Arc::new(storage))
}

/// Create a [`CredentialStore`] over the default durable storage.
pub fn create_credential_store(path: &Path) -> StorageResult<CredentialStore> {
    let storage = create_storage(path)?;
    Ok(CredentialStore::new(storage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_storage_keys_are_distinct() {
        assert!(!StorageKeys::ACCESS_TOKEN.is_empty());
        assert!(!StorageKeys::REFRESH_TOKEN.is_empty());
        assert_ne!(StorageKeys::ACCESS_TOKEN, StorageKeys::REFRESH_TOKEN);
    }

    #[test]
    fn test_create_credential_store() {
        let dir = tempdir().unwrap();
        let store = create_credential_store(&dir.path().join("credentials.json")).unwrap();

        store.write(&CredentialPair::new("a", "r")).unwrap();
        assert!(store.has_credentials());
    }

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::Encoding("bad json".into());
        assert_eq!(err.to_string(), "Encoding error: bad json");
    }
}
