//! Store mutations.
//!
//! Creates and general updates wait for the server and then apply its
//! canonical record. Toggles and deletes apply locally first and roll the
//! touched entity (and any selection it was part of) back if the server
//! refuses.

use std::collections::BTreeSet;
use std::future::Future;

use stockpile_core::{
    CatalogEntry, Category, CategoryId, CategoryInput, Entity, Group, GroupId, GroupInput,
    InventoryItem, InventoryItemInput, ItemId, Location, LocationId, LocationInput, ShoppingItem,
    ShoppingItemId, ShoppingItemInput, WishItem, WishItemId, WishItemInput, sort_catalog,
};
use tracing::{debug, instrument, warn};

use super::state::{ListState, StoreState};
use super::{StoreError, SyncStore};
use crate::api::ImageUpload;
use crate::pipeline::ApiError;

type Slot<T> = fn(&mut StoreState) -> &mut ListState<T>;
type SelectionSlot<I> = fn(&mut StoreState) -> &mut BTreeSet<I>;

/// Selection set an optimistic delete also removes the id from.
struct Selection<I> {
    slot: SelectionSlot<I>,
    save: fn(&SyncStore) -> Result<(), StoreError>,
}

impl SyncStore {
    // =========================================================================
    // Groups
    // =========================================================================

    /// # Errors
    ///
    /// Returns the API error if the server rejects the group.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_group(&self, input: &GroupInput) -> Result<Group, StoreError> {
        let group = self
            .api
            .create_group(input)
            .await
            .map_err(|e| self.record(e))?;
        self.state.send_modify(|state| state.groups.upsert(group.clone()));
        Ok(group)
    }

    /// # Errors
    ///
    /// Returns the API error if the server rejects the update.
    #[instrument(skip(self, input), fields(group_id = %id))]
    pub async fn update_group(&self, id: &GroupId, input: &GroupInput) -> Result<Group, StoreError> {
        let group = self
            .api
            .update_group(id, input)
            .await
            .map_err(|e| self.record(e))?;
        self.state.send_modify(|state| {
            state.groups.replace(group.clone());
        });
        Ok(group)
    }

    /// Delete a group. Deleting the active group reloads with the next one.
    /// Returns the server's copy of the group when the response carries one.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown group, or the API error
    /// after restoring the group.
    #[instrument(skip(self), fields(group_id = %id))]
    pub async fn delete_group(&self, id: &GroupId) -> Result<Option<Group>, StoreError> {
        let was_active = self.state.borrow().active_group_id.as_ref() == Some(id);

        let deleted = self
            .delete_optimistic(id, |state| &mut state.groups, None, self.api.delete_group(id))
            .await?;

        if was_active {
            debug!("Active group deleted; reloading");
            self.state.send_modify(|state| {
                state.active_group_id = None;
                state.clear_group_data();
            });
            self.load_all().await?;
        }
        Ok(deleted)
    }

    /// Join a group by invite code and make it active.
    ///
    /// # Errors
    ///
    /// Returns the API error for an unknown code.
    #[instrument(skip(self, invite_code))]
    pub async fn join_group(&self, invite_code: &str) -> Result<Group, StoreError> {
        let group = self
            .api
            .join_group(invite_code)
            .await
            .map_err(|e| self.record(e))?;
        self.state.send_modify(|state| state.groups.upsert(group.clone()));
        self.switch_group(&group.id).await?;
        Ok(group)
    }

    // =========================================================================
    // Catalogs
    // =========================================================================

    /// Create a category in the active group unless `input` names another.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoActiveGroup` without a group, or the API error.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_category(&self, mut input: CategoryInput) -> Result<Category, StoreError> {
        if input.group_id.is_none() {
            input.group_id = Some(self.active_group_id().map_err(|e| self.record(e))?);
        }
        let category = self
            .api
            .create_category(&input)
            .await
            .map_err(|e| self.record(e))?;
        self.apply_catalog_entry(|state| &mut state.categories, category.clone());
        Ok(category)
    }

    /// # Errors
    ///
    /// Returns the API error if the server rejects the update.
    #[instrument(skip(self, input), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        id: &CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, StoreError> {
        let category = self
            .api
            .update_category(id, input)
            .await
            .map_err(|e| self.record(e))?;
        self.apply_catalog_entry(|state| &mut state.categories, category.clone());
        Ok(category)
    }

    /// Delete a category, dropping it from the selection as well.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown category, or the API
    /// error after restoring the category and its selection.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn delete_category(&self, id: &CategoryId) -> Result<Option<Category>, StoreError> {
        self.delete_optimistic(
            id,
            |state| &mut state.categories,
            Some(Selection {
                slot: |state| &mut state.selected_categories,
                save: SyncStore::save_category_selection,
            }),
            self.api.delete_category(id),
        )
        .await
    }

    /// Create a location in the active group unless `input` names another.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoActiveGroup` without a group, or the API error.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_location(&self, mut input: LocationInput) -> Result<Location, StoreError> {
        if input.group_id.is_none() {
            input.group_id = Some(self.active_group_id().map_err(|e| self.record(e))?);
        }
        let location = self
            .api
            .create_location(&input)
            .await
            .map_err(|e| self.record(e))?;
        self.apply_catalog_entry(|state| &mut state.locations, location.clone());
        Ok(location)
    }

    /// # Errors
    ///
    /// Returns the API error if the server rejects the update.
    #[instrument(skip(self, input), fields(location_id = %id))]
    pub async fn update_location(
        &self,
        id: &LocationId,
        input: &LocationInput,
    ) -> Result<Location, StoreError> {
        let location = self
            .api
            .update_location(id, input)
            .await
            .map_err(|e| self.record(e))?;
        self.apply_catalog_entry(|state| &mut state.locations, location.clone());
        Ok(location)
    }

    /// Delete a location, dropping it from the selection as well.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown location, or the API
    /// error after restoring the location and its selection.
    #[instrument(skip(self), fields(location_id = %id))]
    pub async fn delete_location(&self, id: &LocationId) -> Result<Option<Location>, StoreError> {
        self.delete_optimistic(
            id,
            |state| &mut state.locations,
            Some(Selection {
                slot: |state| &mut state.selected_locations,
                save: SyncStore::save_location_selection,
            }),
            self.api.delete_location(id),
        )
        .await
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    /// # Errors
    ///
    /// Returns the API error if the server rejects the item.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_item(&self, input: &InventoryItemInput) -> Result<InventoryItem, StoreError> {
        let item = self
            .api
            .create_item(input)
            .await
            .map_err(|e| self.record(e))?;
        self.append_to_active_group(|state| &mut state.items, item.clone());
        Ok(item)
    }

    /// # Errors
    ///
    /// Returns the API error if the server rejects the update.
    #[instrument(skip(self, input), fields(item_id = %id))]
    pub async fn update_item(
        &self,
        id: &ItemId,
        input: &InventoryItemInput,
    ) -> Result<InventoryItem, StoreError> {
        let item = self
            .api
            .update_item(id, input)
            .await
            .map_err(|e| self.record(e))?;
        self.state.send_modify(|state| {
            state.items.replace(item.clone());
        });
        Ok(item)
    }

    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown item, or the API error
    /// after restoring it.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn delete_item(&self, id: &ItemId) -> Result<Option<InventoryItem>, StoreError> {
        self.delete_optimistic(id, |state| &mut state.items, None, self.api.delete_item(id))
            .await
    }

    /// Attach a photo and store the item the server returns.
    ///
    /// # Errors
    ///
    /// Returns the API error if the upload fails.
    #[instrument(skip(self, image), fields(item_id = %id))]
    pub async fn upload_item_image(
        &self,
        id: &ItemId,
        image: ImageUpload,
    ) -> Result<InventoryItem, StoreError> {
        let item = self
            .api
            .upload_item_image(id, image)
            .await
            .map_err(|e| self.record(e))?;
        self.state.send_modify(|state| {
            state.items.replace(item.clone());
        });
        Ok(item)
    }

    // =========================================================================
    // Shopping
    // =========================================================================

    /// # Errors
    ///
    /// Returns the API error if the server rejects the entry.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_shopping_item(
        &self,
        input: &ShoppingItemInput,
    ) -> Result<ShoppingItem, StoreError> {
        let item = self
            .api
            .create_shopping_item(input)
            .await
            .map_err(|e| self.record(e))?;
        self.append_to_active_group(|state| &mut state.shopping, item.clone());
        Ok(item)
    }

    /// # Errors
    ///
    /// Returns the API error if the server rejects the update.
    #[instrument(skip(self, input), fields(shopping_item_id = %id))]
    pub async fn update_shopping_item(
        &self,
        id: &ShoppingItemId,
        input: &ShoppingItemInput,
    ) -> Result<ShoppingItem, StoreError> {
        let item = self
            .api
            .update_shopping_item(id, input)
            .await
            .map_err(|e| self.record(e))?;
        self.state.send_modify(|state| {
            state.shopping.replace(item.clone());
        });
        Ok(item)
    }

    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown entry, or the API error
    /// after restoring it.
    #[instrument(skip(self), fields(shopping_item_id = %id))]
    pub async fn delete_shopping_item(&self, id: &ShoppingItemId) -> Result<Option<ShoppingItem>, StoreError> {
        self.delete_optimistic(
            id,
            |state| &mut state.shopping,
            None,
            self.api.delete_shopping_item(id),
        )
        .await
    }

    /// Flip `is_purchased` immediately, then confirm with the server.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown entry, or the API error
    /// after restoring the previous flag.
    #[instrument(skip(self), fields(shopping_item_id = %id))]
    pub async fn toggle_shopping_item(&self, id: &ShoppingItemId) -> Result<ShoppingItem, StoreError> {
        self.toggle_optimistic(
            id,
            |state| &mut state.shopping,
            |item: &mut ShoppingItem| item.is_purchased = !item.is_purchased,
            |mut item: ShoppingItem| async move {
                if item.group_id.is_none() {
                    item.group_id = Some(self.active_group_id()?);
                }
                let input = ShoppingItemInput::from_item(&item).ok_or(StoreError::NoActiveGroup)?;
                Ok::<_, StoreError>(self.api.update_shopping_item(&item.id, &input).await?)
            },
        )
        .await
    }

    // =========================================================================
    // Wishes
    // =========================================================================

    /// # Errors
    ///
    /// Returns the API error if the server rejects the wish.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_wish(&self, input: &WishItemInput) -> Result<WishItem, StoreError> {
        let wish = self
            .api
            .create_wish(input)
            .await
            .map_err(|e| self.record(e))?;
        self.append_to_active_group(|state| &mut state.wishes, wish.clone());
        Ok(wish)
    }

    /// # Errors
    ///
    /// Returns the API error if the server rejects the update.
    #[instrument(skip(self, input), fields(wish_id = %id))]
    pub async fn update_wish(
        &self,
        id: &WishItemId,
        input: &WishItemInput,
    ) -> Result<WishItem, StoreError> {
        let wish = self
            .api
            .update_wish(id, input)
            .await
            .map_err(|e| self.record(e))?;
        self.state.send_modify(|state| {
            state.wishes.replace(wish.clone());
        });
        Ok(wish)
    }

    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown wish, or the API error
    /// after restoring it.
    #[instrument(skip(self), fields(wish_id = %id))]
    pub async fn delete_wish(&self, id: &WishItemId) -> Result<Option<WishItem>, StoreError> {
        self.delete_optimistic(id, |state| &mut state.wishes, None, self.api.delete_wish(id))
            .await
    }

    /// Flip `is_fulfilled` immediately, then confirm with the server.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown wish, or the API error
    /// after restoring the previous flag.
    #[instrument(skip(self), fields(wish_id = %id))]
    pub async fn toggle_wish(&self, id: &WishItemId) -> Result<WishItem, StoreError> {
        self.toggle_optimistic(
            id,
            |state| &mut state.wishes,
            |wish: &mut WishItem| wish.is_fulfilled = !wish.is_fulfilled,
            |mut wish: WishItem| async move {
                if wish.group_id.is_none() {
                    wish.group_id = Some(self.active_group_id()?);
                }
                let input = WishItemInput::from_item(&wish).ok_or(StoreError::NoActiveGroup)?;
                Ok::<_, StoreError>(self.api.update_wish(&wish.id, &input).await?)
            },
        )
        .await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Remove locally, call `remote`, restore on failure.
    ///
    /// A restored selection is saved again: a selection change made while
    /// the delete was in flight may have persisted the set without `id`.
    async fn delete_optimistic<T, F>(
        &self,
        id: &T::Id,
        slot: Slot<T>,
        selection: Option<Selection<T::Id>>,
        remote: F,
    ) -> Result<Option<T>, StoreError>
    where
        T: Entity + Clone,
        F: Future<Output = Result<Option<T>, ApiError>>,
    {
        let mut removed = None;
        let mut deselected = false;
        self.state.send_if_modified(|state| {
            removed = slot(state).remove(id);
            if removed.is_some()
                && let Some(selection) = &selection
            {
                deselected = (selection.slot)(state).remove(id);
            }
            removed.is_some()
        });

        let Some((index, entity)) = removed else {
            return Err(self.record(StoreError::not_found::<T>(id)));
        };

        match remote.await {
            Ok(deleted) => {
                debug!(kind = T::KIND, id = %id, "Deleted");
                self.persist_selection(deselected, selection.as_ref());
                Ok(deleted)
            }
            Err(e) => {
                warn!(kind = T::KIND, id = %id, error = %e, "Delete failed; restoring");
                let message = e.to_string();
                self.state.send_modify(|state| {
                    slot(state).restore(index, entity);
                    if deselected && let Some(selection) = &selection {
                        (selection.slot)(state).insert(id.clone());
                    }
                    state.error = Some(message);
                });
                self.persist_selection(deselected, selection.as_ref());
                Err(e.into())
            }
        }
    }

    fn persist_selection<I>(&self, changed: bool, selection: Option<&Selection<I>>) {
        if changed
            && let Some(selection) = selection
            && let Err(e) = (selection.save)(self)
        {
            warn!(error = %e, "Failed to persist selection");
        }
    }

    /// Apply `flip` locally, send the flipped entity, reconcile or restore.
    async fn toggle_optimistic<T, R, Fut>(
        &self,
        id: &T::Id,
        slot: Slot<T>,
        flip: fn(&mut T),
        remote: R,
    ) -> Result<T, StoreError>
    where
        T: Entity + Clone,
        R: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let mut snapshot = None;
        let mut flipped = None;
        self.state.send_if_modified(|state| {
            let list = slot(state);
            snapshot = list.get(id).cloned();
            flipped = list.update(id, flip);
            flipped.is_some()
        });

        let (Some(original), Some(flipped)) = (snapshot, flipped) else {
            return Err(self.record(StoreError::not_found::<T>(id)));
        };

        match remote(flipped).await {
            Ok(canonical) => {
                self.state.send_modify(|state| {
                    slot(state).replace(canonical.clone());
                });
                Ok(canonical)
            }
            Err(e) => {
                warn!(kind = T::KIND, id = %id, error = %e, "Toggle failed; restoring");
                let message = e.to_string();
                self.state.send_modify(|state| {
                    slot(state).replace(original);
                    state.error = Some(message);
                });
                Err(e)
            }
        }
    }

    /// Insert or replace a catalog entry and keep the catalog ordered.
    fn apply_catalog_entry<T: CatalogEntry>(&self, slot: Slot<T>, entry: T) {
        self.state.send_modify(|state| {
            let belongs = match entry.group_id() {
                None => true,
                Some(owner) => state.active_group_id.as_ref() == Some(owner),
            };
            if belongs {
                let list = slot(state);
                list.upsert(entry);
                sort_catalog(list.items_mut());
            }
        });
    }

    /// Append a created entity if it belongs to the active group.
    fn append_to_active_group<T: Entity>(&self, slot: Slot<T>, entity: T) {
        self.state.send_if_modified(|state| {
            let belongs = entity.group_id().is_some()
                && entity.group_id() == state.active_group_id.as_ref();
            if belongs {
                slot(state).upsert(entity);
            }
            belongs
        });
    }
}
