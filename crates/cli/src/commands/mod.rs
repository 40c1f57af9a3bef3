//! Command implementations.
//!
//! Every command builds a [`Context`] from the environment: configuration,
//! file-backed credential and preference stores under the data directory,
//! and a store wired to the live API.

pub mod auth;
pub mod catalog;
pub mod groups;
pub mod lists;

use std::sync::Arc;

use stockpile_client::{
    ApiClient, ApiError, AuthError, ClientConfig, ConfigError, FileCredentialStore,
    FilePreferenceStore, RequestPipeline, SessionManager, StorageError, StoreError, SyncStore,
};
use stockpile_core::AuthInputError;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid input: {0}")]
    Input(#[from] AuthInputError),

    /// The command needs a session and none is stored.
    #[error("Not signed in; run `stockpile login` first")]
    NotSignedIn,
}

/// Everything a command needs to talk to the server.
pub struct Context {
    pub api: ApiClient,
    pub session: SessionManager,
    pub store: SyncStore,
}

impl Context {
    /// Build the client stack from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` if configuration is missing or invalid.
    pub fn from_env() -> Result<Self, CommandError> {
        dotenvy::dotenv().ok();

        let config = ClientConfig::from_env()?;
        let data_dir = config.resolve_data_dir()?;
        debug!(base_url = %config.base_url, data_dir = %data_dir.display(), "Loaded configuration");

        let session = SessionManager::new(Arc::new(FileCredentialStore::new(&data_dir)));
        let pipeline = RequestPipeline::new(&config, session.clone())?;
        let api = ApiClient::new(pipeline);
        let store = SyncStore::new(
            Arc::new(api.clone()),
            Arc::new(FilePreferenceStore::new(&data_dir)),
            session.clone(),
        );
        store.restore_selections();

        Ok(Self {
            api,
            session,
            store,
        })
    }

    /// Like [`Context::from_env`], but fails early without a session.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::NotSignedIn` if no credentials are stored.
    pub fn signed_in() -> Result<Self, CommandError> {
        let context = Self::from_env()?;
        if !context.session.is_authenticated() {
            return Err(CommandError::NotSignedIn);
        }
        Ok(context)
    }

    /// Sign in check plus a full load of the active group.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` if not signed in or the group list fails.
    pub async fn synced() -> Result<Self, CommandError> {
        let context = Self::signed_in()?;
        context.store.load_all().await?;
        Ok(context)
    }
}
