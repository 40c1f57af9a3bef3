//! Local key-value storage for credentials and preferences.
//!
//! Two narrow traits sit at this seam:
//!
//! - [`CredentialStore`] holds the three session secrets. Values are
//!   `SecretString` so they never leak through `Debug` or logs.
//! - [`PreferenceStore`] holds small JSON values that survive restarts
//!   (selection sets, the last active group).
//!
//! Both ship with an in-memory implementation for tests and ephemeral use,
//! and a file-backed implementation that replaces its file atomically.

mod file;
mod memory;

pub use file::{FileCredentialStore, FilePreferenceStore};
pub use memory::{MemoryCredentialStore, MemoryPreferenceStore};

use secrecy::SecretString;
use thiserror::Error;

/// Errors raised by credential and preference stores.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not valid JSON.
    #[error("Storage data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// An in-memory lock was poisoned by a panicking writer.
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// The secrets a session consists of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    AccessToken,
    RefreshToken,
    DeviceId,
}

impl CredentialKey {
    /// Every key, in a fixed order.
    pub const ALL: [Self; 3] = [Self::AccessToken, Self::RefreshToken, Self::DeviceId];

    /// Stable storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
            Self::DeviceId => "device_id",
        }
    }
}

/// Opaque secret storage.
///
/// Implementations must make each call atomic: a reader never observes a
/// partially written value.
pub trait CredentialStore: Send + Sync {
    /// Read a secret.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    fn get(&self, key: CredentialKey) -> Result<Option<SecretString>, StorageError>;

    /// Write a secret, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    fn set(&self, key: CredentialKey, value: SecretString) -> Result<(), StorageError>;

    /// Remove a secret. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    fn delete(&self, key: CredentialKey) -> Result<(), StorageError>;
}

/// Small persisted user preferences.
pub trait PreferenceStore: Send + Sync {
    /// Read a preference.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError>;

    /// Write a preference. `Value::Null` removes the key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError>;
}
