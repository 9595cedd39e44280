//! Access/refresh credential pair persistence.

use crate::{SecureStorage, StorageKeys, StorageResult};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// The current access and refresh tokens. Always stored and cleared together.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl CredentialPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Pair-level view over a [`SecureStorage`] backend.
///
/// Both halves go through the backend's batch calls, which [`FileStorage`]
/// commits in a single rename. The lock here keeps backends that apply a
/// batch key by key invisible to [`read`](Self::read) mid-sequence.
///
/// [`FileStorage`]: crate::FileStorage
pub struct CredentialStore {
    storage: Arc<dyn SecureStorage>,
    pair_lock: RwLock<()>,
}

impl CredentialStore {
    pub fn new(storage: Arc<dyn SecureStorage>) -> Self {
        Self {
            storage,
            pair_lock: RwLock::new(()),
        }
    }

    /// Current pair, or `None` when logged out.
    ///
    /// Never fails. Backend errors and a pair with only one half present are
    /// both reported as absent.
    pub fn read(&self) -> Option<CredentialPair> {
        let _guard = self.pair_lock.read();

        let access = self.get_logged(StorageKeys::ACCESS_TOKEN)?;
        let refresh = self.get_logged(StorageKeys::REFRESH_TOKEN)?;

        match (access, refresh) {
            (Some(access_token), Some(refresh_token)) => Some(CredentialPair {
                access_token,
                refresh_token,
            }),
            (None, None) => None,
            _ => {
                tracing::warn!("stored credential pair is incomplete; treating as logged out");
                None
            }
        }
    }

    /// Replace the stored pair.
    ///
    /// If the batch fails both keys are removed before the error is returned,
    /// so a partial pair never remains.
    pub fn write(&self, pair: &CredentialPair) -> StorageResult<()> {
        let _guard = self.pair_lock.write();

        if let Err(e) = self.storage.set_many(&[
            (StorageKeys::ACCESS_TOKEN, pair.access_token.as_str()),
            (StorageKeys::REFRESH_TOKEN, pair.refresh_token.as_str()),
        ]) {
            tracing::error!(error = %e, "failed to persist credential pair; rolling back");
            if let Err(rollback) = self.storage.delete_many(&StorageKeys::CREDENTIAL_PAIR) {
                tracing::error!(error = %rollback, "rollback delete failed");
            }
            return Err(e);
        }

        tracing::debug!("credential pair stored");
        Ok(())
    }

    /// Remove both tokens. Safe to call when nothing is stored.
    pub fn clear(&self) -> StorageResult<()> {
        let _guard = self.pair_lock.write();

        self.storage.delete_many(&StorageKeys::CREDENTIAL_PAIR)?;
        tracing::debug!("credential pair cleared");
        Ok(())
    }

    pub fn has_credentials(&self) -> bool {
        self.read().is_some()
    }

    /// Access token of the current pair.
    pub fn access_token(&self) -> Option<String> {
        self.read().map(|pair| pair.access_token)
    }

    fn get_logged(&self, key: &str) -> Option<Option<String>> {
        match self.storage.get(key) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "credential read failed; treating as logged out");
                None
            }
        }
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}
