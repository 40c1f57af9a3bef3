//! Synchronized state store.
//!
//! The in-memory mirror of the signed-in user's data. Every public
//! operation pairs a local state change with a remote call through
//! [`InventoryApi`]:
//!
//! - **Loads** run in two phases: groups first, then every group-scoped
//!   list concurrently. A failing list degrades on its own.
//! - **Creates and updates** wait for the server and apply its canonical
//!   record.
//! - **Toggles and deletes** apply immediately and are rolled back if the
//!   server refuses them.
//!
//! State is published through a [`tokio::sync::watch`] channel. Each
//! read-modify-write step runs inside one `send_modify` closure, so
//! concurrent operations never interleave mid-mutation and no lock is held
//! across an `.await`.

mod load;
mod mutations;
mod selection;
mod state;

pub use state::{ListState, StoreState};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use stockpile_core::GroupId;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::api::InventoryApi;
use crate::pipeline::ApiError;
use crate::session::SessionManager;
use crate::storage::{PreferenceStore, StorageError};

/// Preference key for the selected category ids.
pub const SELECTED_CATEGORIES_KEY: &str = "selected_categories";
/// Preference key for the selected location ids.
pub const SELECTED_LOCATIONS_KEY: &str = "selected_locations";
/// Preference key for the last active group id.
pub const ACTIVE_GROUP_KEY: &str = "active_group";

/// Errors surfaced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The operation needs an active group and none is selected.
    #[error("No active group selected")]
    NoActiveGroup,

    /// The entity is not in the local mirror.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// Preferences could not be read or written.
    #[error("Failed to persist preferences: {0}")]
    Storage(#[from] StorageError),
}

impl StoreError {
    fn not_found<T: stockpile_core::Entity>(id: &T::Id) -> Self {
        Self::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        }
    }
}

/// UI-facing source of truth for synchronized data.
pub struct SyncStore {
    api: Arc<dyn InventoryApi>,
    preferences: Arc<dyn PreferenceStore>,
    session: SessionManager,
    state: watch::Sender<StoreState>,
    /// Bumped by every load; results from older loads are discarded.
    generation: AtomicU64,
}

impl std::fmt::Debug for SyncStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncStore")
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl SyncStore {
    #[must_use]
    pub fn new(
        api: Arc<dyn InventoryApi>,
        preferences: Arc<dyn PreferenceStore>,
        session: SessionManager,
    ) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self {
            api,
            preferences,
            session,
            state,
            generation: AtomicU64::new(0),
        }
    }

    /// A copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    /// Receive every state change. Use `changed().await` to wait for one.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    /// Forget the last error message.
    pub fn clear_error(&self) {
        self.state.send_if_modified(|state| state.error.take().is_some());
    }

    /// Sign out.
    ///
    /// The remote logout is best effort: local credentials are cleared and
    /// the mirror reset whether or not the server acknowledges it. Selection
    /// sets survive, as they are device preferences.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) {
        if let Err(e) = self.api.logout().await {
            warn!(error = %e, "Remote logout failed; signing out locally");
        }
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear stored credentials");
        }

        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|state| {
            *state = StoreState {
                selected_categories: std::mem::take(&mut state.selected_categories),
                selected_locations: std::mem::take(&mut state.selected_locations),
                ..StoreState::default()
            };
        });
        debug!("Signed out");
    }

    fn active_group_id(&self) -> Result<GroupId, StoreError> {
        self.state
            .borrow()
            .active_group_id
            .clone()
            .ok_or(StoreError::NoActiveGroup)
    }

    /// Record an error as the store's last error and hand it back.
    fn record<E: Into<StoreError>>(&self, err: E) -> StoreError {
        let err = err.into();
        let message = err.to_string();
        self.state.send_modify(|state| state.error = Some(message));
        err
    }
}

#[cfg(test)]
pub(crate) mod test_support;
