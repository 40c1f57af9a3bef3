//! Group-scoped load sequencing.
//!
//! Phase 1 resolves the active group from the group list. Phase 2 fetches
//! both catalog populations and the three lists for that group
//! concurrently; each result is applied on its own, so one failing fetch
//! never blanks the others.

use std::sync::atomic::Ordering;

use stockpile_core::{CatalogEntry, Group, GroupId, merge_catalog};
use tracing::{debug, instrument, warn};

use super::state::ListState;
use super::{ACTIVE_GROUP_KEY, StoreError, SyncStore};
use crate::pipeline::ApiError;

/// Keep `preferred` if it is still among `groups`, else the first group.
pub(crate) fn resolve_active_group(
    groups: &[Group],
    preferred: Option<&GroupId>,
) -> Option<GroupId> {
    preferred
        .filter(|id| groups.iter().any(|g| &g.id == *id))
        .cloned()
        .or_else(|| groups.first().map(|g| g.id.clone()))
}

/// Fold the outcome of one list fetch into its slice.
///
/// A failure keeps whatever the slice already held for `group_id`.
fn apply_list<T: stockpile_core::Entity + Clone>(
    slot: &mut ListState<T>,
    result: Result<Vec<T>, ApiError>,
    group_id: &GroupId,
    kind: &'static str,
) {
    match result {
        Ok(entries) => *slot = ListState::Loaded(entries),
        Err(e) => {
            warn!(kind, error = %e, "Failed to load list; keeping stale entries");
            let stale = slot.owned_by(group_id);
            slot.fail(e.to_string(), stale);
        }
    }
}

/// Merge default and group catalog fetches into one slice.
///
/// Either population failing on its own counts as empty; only when both
/// fail does the slice move to the error state.
fn apply_catalog<T: CatalogEntry + Clone>(
    slot: &mut ListState<T>,
    defaults: Result<Vec<T>, ApiError>,
    custom: Result<Vec<T>, ApiError>,
    group_id: &GroupId,
    kind: &'static str,
) {
    match (defaults, custom) {
        (Err(defaults_err), Err(_)) => {
            warn!(kind, error = %defaults_err, "Failed to load catalog");
            let stale = slot
                .items()
                .iter()
                .filter(|entry| entry.group_id().is_none_or(|owner| owner == group_id))
                .cloned()
                .collect();
            slot.fail(defaults_err.to_string(), stale);
        }
        (defaults, custom) => {
            let defaults = defaults.unwrap_or_else(|e| {
                warn!(kind, error = %e, "Failed to load default catalog; using group entries only");
                Vec::new()
            });
            let custom = custom.unwrap_or_else(|e| {
                warn!(kind, error = %e, "Failed to load group catalog; using defaults only");
                Vec::new()
            });
            *slot = ListState::Loaded(merge_catalog(&defaults, &custom));
        }
    }
}

impl SyncStore {
    /// Load everything for the session.
    ///
    /// Fetches the groups, keeps the previously active group when it is
    /// still present (falling back to the first group), then loads that
    /// group's data.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Api` if the group list cannot be fetched.
    /// Failures of individual group-scoped lists are recorded on the list
    /// and do not fail the load.
    #[instrument(skip(self))]
    pub async fn load_all(&self) -> Result<(), StoreError> {
        let generation = self.begin_load();

        let groups = match self.api.list_groups().await {
            Ok(groups) => groups,
            Err(e) => {
                if self.is_current(generation) {
                    let message = e.to_string();
                    self.state.send_modify(|state| {
                        let stale = state.groups.items().to_vec();
                        state.groups.fail(message.clone(), stale);
                        state.is_loading = false;
                        state.error = Some(message);
                    });
                }
                return Err(e.into());
            }
        };

        if !self.is_current(generation) {
            debug!(generation, "Dropping superseded group list");
            return Ok(());
        }

        let preferred = self.preferred_group();
        let active = resolve_active_group(&groups, preferred.as_ref());
        debug!(count = groups.len(), active = ?active, "Resolved active group");

        if active != preferred {
            self.persist_active_group(active.as_ref());
        }

        self.state.send_modify(|state| {
            state.groups = ListState::Loaded(groups);
            if state.active_group_id != active {
                state.clear_group_data();
            }
            state.active_group_id.clone_from(&active);
            if active.is_none() {
                state.clear_group_data();
                state.is_loading = false;
            }
        });

        match active {
            Some(group_id) => {
                self.load_group_data(generation, &group_id).await;
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Make `group_id` the active group and load its data.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for a group that is not loaded, or
    /// `StoreError::Storage` if the choice cannot be persisted.
    #[instrument(skip(self), fields(group_id = %group_id))]
    pub async fn switch_group(&self, group_id: &GroupId) -> Result<(), StoreError> {
        if !self.state.borrow().groups.contains(group_id) {
            return Err(self.record(StoreError::not_found::<Group>(group_id)));
        }

        self.preferences
            .set(ACTIVE_GROUP_KEY, serde_json::json!(group_id))
            .map_err(|e| self.record(e))?;

        let generation = self.begin_load();
        self.state.send_modify(|state| {
            if state.active_group_id.as_ref() != Some(group_id) {
                state.clear_group_data();
            }
            state.active_group_id = Some(group_id.clone());
        });

        self.load_group_data(generation, group_id).await;
        Ok(())
    }

    /// Reload both catalogs for the active group.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoActiveGroup` when no group is selected.
    #[instrument(skip(self))]
    pub async fn refresh_catalogs(&self) -> Result<(), StoreError> {
        let group_id = self.active_group_id().map_err(|e| self.record(e))?;
        let generation = self.generation.load(Ordering::SeqCst);

        let api = &*self.api;
        let (default_categories, group_categories, default_locations, group_locations) = tokio::join!(
            api.list_categories(None),
            api.list_categories(Some(&group_id)),
            api.list_locations(None),
            api.list_locations(Some(&group_id)),
        );

        if !self.is_current(generation) {
            debug!(generation, "Dropping superseded catalog refresh");
            return Ok(());
        }

        self.state.send_modify(|state| {
            apply_catalog(
                &mut state.categories,
                default_categories,
                group_categories,
                &group_id,
                "categories",
            );
            apply_catalog(
                &mut state.locations,
                default_locations,
                group_locations,
                &group_id,
                "locations",
            );
        });
        Ok(())
    }

    /// Phase 2: every group-scoped fetch, concurrently.
    async fn load_group_data(&self, generation: u64, group_id: &GroupId) {
        let api = &*self.api;
        let (
            default_categories,
            group_categories,
            default_locations,
            group_locations,
            items,
            shopping,
            wishes,
        ) = tokio::join!(
            api.list_categories(None),
            api.list_categories(Some(group_id)),
            api.list_locations(None),
            api.list_locations(Some(group_id)),
            api.list_items(group_id),
            api.list_shopping(group_id),
            api.list_wishes(group_id),
        );

        if !self.is_current(generation) {
            debug!(generation, "Dropping superseded group load");
            return;
        }

        self.state.send_modify(|state| {
            apply_catalog(
                &mut state.categories,
                default_categories,
                group_categories,
                group_id,
                "categories",
            );
            apply_catalog(
                &mut state.locations,
                default_locations,
                group_locations,
                group_id,
                "locations",
            );
            apply_list(&mut state.items, items, group_id, "items");
            apply_list(&mut state.shopping, shopping, group_id, "shopping");
            apply_list(&mut state.wishes, wishes, group_id, "wishes");
            state.is_loading = false;
        });
        debug!(group_id = %group_id, "Group data loaded");
    }

    /// Start a load: supersede older ones and raise the loading flag.
    fn begin_load(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });
        generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// The in-memory active group, else the persisted one.
    fn preferred_group(&self) -> Option<GroupId> {
        if let Some(id) = self.state.borrow().active_group_id.clone() {
            return Some(id);
        }
        match self.preferences.get(ACTIVE_GROUP_KEY) {
            Ok(value) => value.and_then(|v| serde_json::from_value(v).ok()),
            Err(e) => {
                warn!(error = %e, "Failed to read persisted active group");
                None
            }
        }
    }

    fn persist_active_group(&self, group_id: Option<&GroupId>) {
        let value = group_id.map_or(serde_json::Value::Null, |id| serde_json::json!(id));
        if let Err(e) = self.preferences.set(ACTIVE_GROUP_KEY, value) {
            warn!(error = %e, "Failed to persist active group");
        }
    }
}
