//! Session lifecycle over a [`CredentialStore`].
//!
//! The session manager is a storage façade: it performs no network calls
//! and no retries. The request pipeline consults it for the bearer token
//! and calls back into it when a refresh succeeds or fails.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use stockpile_core::TokenPair;
use tracing::{debug, instrument, warn};

use crate::storage::{CredentialKey, CredentialStore, StorageError};

/// Snapshot of the stored credentials.
#[derive(Clone, Default)]
pub struct Session {
    pub access_token: Option<SecretString>,
    pub refresh_token: Option<SecretString>,
    pub device_id: Option<String>,
}

impl Session {
    /// True iff an access token is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("device_id", &self.device_id)
            .finish()
    }
}

/// Owns the credential lifecycle: load, save, clear.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").finish_non_exhaustive()
    }
}

impl SessionManager {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Read the current session. No side effects.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the credential store cannot be read.
    pub fn load(&self) -> Result<Session, StorageError> {
        Ok(Session {
            access_token: self.store.get(CredentialKey::AccessToken)?,
            refresh_token: self.store.get(CredentialKey::RefreshToken)?,
            device_id: self
                .store
                .get(CredentialKey::DeviceId)?
                .map(|id| id.expose_secret().to_owned()),
        })
    }

    /// Persist a token pair, and the device id when one is given.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the credential store cannot be written.
    #[instrument(skip(self, tokens))]
    pub fn save(&self, tokens: &TokenPair, device_id: Option<&str>) -> Result<(), StorageError> {
        self.store.set(
            CredentialKey::AccessToken,
            SecretString::from(tokens.access_token.as_str()),
        )?;
        self.store.set(
            CredentialKey::RefreshToken,
            SecretString::from(tokens.refresh_token.as_str()),
        )?;
        if let Some(device_id) = device_id {
            self.store
                .set(CredentialKey::DeviceId, SecretString::from(device_id))?;
        }
        debug!("Session saved");
        Ok(())
    }

    /// Remove all three secrets.
    ///
    /// Every key is attempted even if an earlier delete fails; the first
    /// failure is returned.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any delete fails.
    #[instrument(skip(self))]
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut first_error = None;
        for key in CredentialKey::ALL {
            if let Err(e) = self.store.delete(key) {
                warn!(key = key.as_str(), error = %e, "Failed to delete credential");
                first_error.get_or_insert(e);
            }
        }
        debug!("Session cleared");
        first_error.map_or(Ok(()), Err)
    }

    /// Whether an access token is present. A local check only.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// Current access token; storage failures read as absent.
    #[must_use]
    pub fn access_token(&self) -> Option<SecretString> {
        self.store
            .get(CredentialKey::AccessToken)
            .inspect_err(|e| warn!(error = %e, "Failed to read access token"))
            .ok()
            .flatten()
    }

    /// Current refresh token; storage failures read as absent.
    #[must_use]
    pub fn refresh_token(&self) -> Option<SecretString> {
        self.store
            .get(CredentialKey::RefreshToken)
            .inspect_err(|e| warn!(error = %e, "Failed to read refresh token"))
            .ok()
            .flatten()
    }

    /// The installation's device id, generated and stored on first use.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or written.
    pub fn device_id(&self) -> Result<String, StorageError> {
        if let Some(id) = self.store.get(CredentialKey::DeviceId)? {
            return Ok(id.expose_secret().to_owned());
        }
        let id = uuid::Uuid::new_v4().to_string();
        self.store
            .set(CredentialKey::DeviceId, SecretString::from(id.as_str()))?;
        debug!(device_id = %id, "Generated device id");
        Ok(id)
    }
}
