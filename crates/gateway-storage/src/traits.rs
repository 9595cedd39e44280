//! Storage trait definitions.

use crate::StorageResult;

/// Key-value backend for secrets.
///
/// Implementations must be safe to share across threads. Each individual
/// call is atomic. The batch calls default to one call per key; backends that
/// can commit several keys at once override them.
pub trait SecureStorage: Send + Sync {
    /// Store a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Retrieve a value
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Delete a value. Returns whether the key existed.
    fn delete(&self, key: &str) -> StorageResult<bool>;

    /// Check if a key exists
    fn has(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Store several values.
    fn set_many(&self, entries: &[(&str, &str)]) -> StorageResult<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Delete several values. Every key is attempted; the first error is returned.
    fn delete_many(&self, keys: &[&str]) -> StorageResult<()> {
        let mut first_err = None;
        for key in keys {
            if let Err(e) = self.delete(key) {
                tracing::error!(key, error = %e, "failed to delete key");
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
