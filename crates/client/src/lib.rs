//! Stockpile Client - Sync layer between the Stockpile server and a front end.
//!
//! This crate owns everything between a screen and the REST API:
//!
//! - `session` - Persisted credentials and the device identifier
//! - `pipeline` - Authenticated requests with single-flight token refresh
//! - `api` - Typed operations over every server resource
//! - `store` - The observable, synchronized mirror of the user's data
//!
//! # Architecture
//!
//! ```text
//! SyncStore ──► InventoryApi (ApiClient) ──► RequestPipeline ──► reqwest
//!     │                                            │
//!     └──► PreferenceStore                         └──► SessionManager ──► CredentialStore
//! ```
//!
//! The store talks to the server only through the [`InventoryApi`] trait,
//! so front ends and tests can substitute their own implementation.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stockpile_client::{
//!     ApiClient, ClientConfig, MemoryCredentialStore, MemoryPreferenceStore, RequestPipeline,
//!     SessionManager, SyncStore,
//! };
//!
//! let config = ClientConfig::from_env()?;
//! let session = SessionManager::new(Arc::new(MemoryCredentialStore::new()));
//! let pipeline = RequestPipeline::new(&config, session.clone())?;
//! let store = SyncStore::new(
//!     Arc::new(ApiClient::new(pipeline)),
//!     Arc::new(MemoryPreferenceStore::new()),
//!     session,
//! );
//! store.load_all().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod pipeline;
pub mod session;
pub mod storage;
pub mod store;

pub use api::{ApiClient, AuthError, ImageUpload, InventoryApi};
pub use config::{ClientConfig, ConfigError, RefreshPolicy};
pub use pipeline::{ApiError, RequestPipeline, RequestSpec};
pub use session::{Session, SessionManager};
pub use storage::{
    CredentialKey, CredentialStore, FileCredentialStore, FilePreferenceStore,
    MemoryCredentialStore, MemoryPreferenceStore, PreferenceStore, StorageError,
};
pub use store::{ListState, StoreError, StoreState, SyncStore};
