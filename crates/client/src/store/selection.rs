//! Category and location filters.
//!
//! Selections are device preferences: they are persisted on every change,
//! survive sign-out, and an empty set means "show everything".

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use stockpile_core::{Category, CategoryId, GroupId, Location, LocationId};
use tracing::{debug, instrument, warn};

use super::{
    ACTIVE_GROUP_KEY, SELECTED_CATEGORIES_KEY, SELECTED_LOCATIONS_KEY, StoreError, SyncStore,
};
use crate::storage::StorageError;

impl SyncStore {
    /// Load persisted selections, and the last active group if none is set.
    ///
    /// Unreadable values are logged and treated as absent.
    #[instrument(skip(self))]
    pub fn restore_selections(&self) {
        let categories: BTreeSet<CategoryId> = self.read_preference(SELECTED_CATEGORIES_KEY);
        let locations: BTreeSet<LocationId> = self.read_preference(SELECTED_LOCATIONS_KEY);
        let active: Option<GroupId> = self.read_preference(ACTIVE_GROUP_KEY);

        debug!(
            categories = categories.len(),
            locations = locations.len(),
            "Restored selections"
        );
        self.state.send_modify(|state| {
            state.selected_categories = categories;
            state.selected_locations = locations;
            if state.active_group_id.is_none() {
                state.active_group_id = active;
            }
        });
    }

    /// Add or remove a category from the filter.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the new selection cannot be saved.
    /// The in-memory selection is updated regardless.
    pub fn toggle_category_selection(&self, id: &CategoryId) -> Result<(), StoreError> {
        self.state
            .send_modify(|state| toggle(&mut state.selected_categories, id));
        self.save_category_selection().map_err(|e| self.record(e))
    }

    /// Add or remove a location from the filter.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the new selection cannot be saved.
    pub fn toggle_location_selection(&self, id: &LocationId) -> Result<(), StoreError> {
        self.state
            .send_modify(|state| toggle(&mut state.selected_locations, id));
        self.save_location_selection().map_err(|e| self.record(e))
    }

    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the cleared selection cannot be saved.
    pub fn clear_category_selection(&self) -> Result<(), StoreError> {
        self.state
            .send_if_modified(|state| clear(&mut state.selected_categories));
        self.save_category_selection().map_err(|e| self.record(e))
    }

    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the cleared selection cannot be saved.
    pub fn clear_location_selection(&self) -> Result<(), StoreError> {
        self.state
            .send_if_modified(|state| clear(&mut state.selected_locations));
        self.save_location_selection().map_err(|e| self.record(e))
    }

    /// Categories passing the current filter.
    #[must_use]
    pub fn visible_categories(&self) -> Vec<Category> {
        self.state
            .borrow()
            .visible_categories()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Locations passing the current filter.
    #[must_use]
    pub fn visible_locations(&self) -> Vec<Location> {
        self.state
            .borrow()
            .visible_locations()
            .into_iter()
            .cloned()
            .collect()
    }

    pub(super) fn save_category_selection(&self) -> Result<(), StoreError> {
        let value = serde_json::to_value(&self.state.borrow().selected_categories)
            .map_err(StorageError::from)?;
        self.preferences.set(SELECTED_CATEGORIES_KEY, value)?;
        Ok(())
    }

    pub(super) fn save_location_selection(&self) -> Result<(), StoreError> {
        let value = serde_json::to_value(&self.state.borrow().selected_locations)
            .map_err(StorageError::from)?;
        self.preferences.set(SELECTED_LOCATIONS_KEY, value)?;
        Ok(())
    }

    fn read_preference<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.preferences.get(key) {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(key, error = %e, "Ignoring unreadable preference");
                T::default()
            }),
            Ok(None) => T::default(),
            Err(e) => {
                warn!(key, error = %e, "Failed to read preference");
                T::default()
            }
        }
    }
}

fn toggle<I: Ord + Clone>(set: &mut BTreeSet<I>, id: &I) {
    if !set.remove(id) {
        set.insert(id.clone());
    }
}

fn clear<I>(set: &mut BTreeSet<I>) -> bool {
    let modified = !set.is_empty();
    set.clear();
    modified
}
