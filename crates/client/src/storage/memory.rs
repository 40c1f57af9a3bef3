//! In-memory stores.

use std::collections::HashMap;
use std::sync::RwLock;

use secrecy::SecretString;

use super::{CredentialKey, CredentialStore, PreferenceStore, StorageError};

/// Credential store that forgets everything when dropped.
#[derive(Default)]
pub struct MemoryCredentialStore {
    secrets: RwLock<HashMap<CredentialKey, SecretString>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for MemoryCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCredentialStore")
            .field("secrets", &"[REDACTED]")
            .finish()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: CredentialKey) -> Result<Option<SecretString>, StorageError> {
        let secrets = self.secrets.read().map_err(|_| StorageError::Poisoned)?;
        Ok(secrets.get(&key).cloned())
    }

    fn set(&self, key: CredentialKey, value: SecretString) -> Result<(), StorageError> {
        let mut secrets = self.secrets.write().map_err(|_| StorageError::Poisoned)?;
        secrets.insert(key, value);
        Ok(())
    }

    fn delete(&self, key: CredentialKey) -> Result<(), StorageError> {
        let mut secrets = self.secrets.write().map_err(|_| StorageError::Poisoned)?;
        secrets.remove(&key);
        Ok(())
    }
}

/// Preference store that forgets everything when dropped.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: RwLock<HashMap<String, serde_json::Value>>,
}

impl MemoryPreferenceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        let values = self.values.read().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError> {
        let mut values = self.values.write().map_err(|_| StorageError::Poisoned)?;
        if value.is_null() {
            values.remove(key);
        } else {
            values.insert(key.to_owned(), value);
        }
        Ok(())
    }
}
