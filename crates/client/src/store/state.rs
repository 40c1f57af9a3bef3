//! Observable store state.

use std::collections::BTreeSet;

use stockpile_core::{
    Category, CategoryId, Entity, Group, GroupId, InventoryItem, Location, LocationId,
    ShoppingItem, WishItem,
};

/// Lifecycle of one synchronized list.
///
/// An error keeps the last good list so callers can keep showing it next
/// to the error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState<T> {
    /// Never loaded for the current group.
    Empty,
    Loaded(Vec<T>),
    Error { message: String, stale: Vec<T> },
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<T> ListState<T> {
    /// The current entries: the loaded list, or the stale list on error.
    #[must_use]
    pub fn items(&self) -> &[T] {
        match self {
            Self::Empty => &[],
            Self::Loaded(items) | Self::Error { stale: items, .. } => items,
        }
    }

    /// The error message, if the last load of this list failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Mutable access to the entries. An `Empty` list becomes `Loaded`.
    pub(crate) fn items_mut(&mut self) -> &mut Vec<T> {
        match self {
            Self::Empty => {
                *self = Self::Loaded(Vec::new());
                self.items_mut()
            }
            Self::Loaded(items) | Self::Error { stale: items, .. } => items,
        }
    }

    /// Move to the error state, keeping `stale` as the visible list.
    pub(crate) fn fail(&mut self, message: impl Into<String>, stale: Vec<T>) {
        *self = Self::Error {
            message: message.into(),
            stale,
        };
    }
}

impl<T: Entity> ListState<T> {
    #[must_use]
    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.items().iter().find(|entity| entity.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: &T::Id) -> bool {
        self.get(id).is_some()
    }

    /// Replace the entry with the same id. Returns whether one was found.
    pub(crate) fn replace(&mut self, entity: T) -> bool {
        let items = self.items_mut();
        match items.iter_mut().find(|existing| existing.id() == entity.id()) {
            Some(slot) => {
                *slot = entity;
                true
            }
            None => false,
        }
    }

    /// Replace the entry with the same id, or append it.
    pub(crate) fn upsert(&mut self, entity: T) {
        if self.contains(entity.id()) {
            self.replace(entity);
        } else {
            self.items_mut().push(entity);
        }
    }

    /// Remove an entry, returning it with its position.
    pub(crate) fn remove(&mut self, id: &T::Id) -> Option<(usize, T)> {
        let items = self.items_mut();
        let index = items.iter().position(|entity| entity.id() == id)?;
        Some((index, items.remove(index)))
    }

    /// Put a removed entry back near its old position, unless an entry
    /// with the same id has reappeared meanwhile.
    pub(crate) fn restore(&mut self, index: usize, entity: T) {
        if self.contains(entity.id()) {
            return;
        }
        let items = self.items_mut();
        let index = index.min(items.len());
        items.insert(index, entity);
    }

    /// Apply `f` to the entry with `id`, returning the updated value.
    pub(crate) fn update<F>(&mut self, id: &T::Id, f: F) -> Option<T>
    where
        F: FnOnce(&mut T),
        T: Clone,
    {
        let entity = self
            .items_mut()
            .iter_mut()
            .find(|entity| entity.id() == id)?;
        f(entity);
        Some(entity.clone())
    }

    /// Entries owned by `group_id`, for keeping as stale data after a
    /// failed reload of the same group.
    pub(crate) fn owned_by(&self, group_id: &GroupId) -> Vec<T>
    where
        T: Clone,
    {
        self.items()
            .iter()
            .filter(|entity| entity.group_id() == Some(group_id))
            .cloned()
            .collect()
    }
}

/// Everything the store mirrors from the server, plus UI selection state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    pub groups: ListState<Group>,
    pub active_group_id: Option<GroupId>,
    /// Defaults merged with the active group's categories.
    pub categories: ListState<Category>,
    /// Defaults merged with the active group's locations.
    pub locations: ListState<Location>,
    pub items: ListState<InventoryItem>,
    pub shopping: ListState<ShoppingItem>,
    pub wishes: ListState<WishItem>,
    pub selected_categories: BTreeSet<CategoryId>,
    pub selected_locations: BTreeSet<LocationId>,
    pub is_loading: bool,
    /// Last error from any store operation, until cleared or superseded.
    pub error: Option<String>,
}

impl StoreState {
    /// The active group record, if it is among the loaded groups.
    #[must_use]
    pub fn active_group(&self) -> Option<&Group> {
        self.active_group_id
            .as_ref()
            .and_then(|id| self.groups.get(id))
    }

    /// Categories passing the selection filter. No selection shows all.
    #[must_use]
    pub fn visible_categories(&self) -> Vec<&Category> {
        visible(self.categories.items(), &self.selected_categories)
    }

    /// Locations passing the selection filter. No selection shows all.
    #[must_use]
    pub fn visible_locations(&self) -> Vec<&Location> {
        visible(self.locations.items(), &self.selected_locations)
    }

    /// Drop everything scoped to a group.
    pub(crate) fn clear_group_data(&mut self) {
        self.categories = ListState::Empty;
        self.locations = ListState::Empty;
        self.items = ListState::Empty;
        self.shopping = ListState::Empty;
        self.wishes = ListState::Empty;
    }
}

fn visible<'a, T: Entity>(entries: &'a [T], selected: &BTreeSet<T::Id>) -> Vec<&'a T> {
    entries
        .iter()
        .filter(|entry| selected.is_empty() || selected.contains(entry.id()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use stockpile_core::{ShoppingItemId, WishItemId};

    use super::*;

    fn shopping(id: &str, group: &str) -> ShoppingItem {
        ShoppingItem {
            id: ShoppingItemId::new(id),
            name: id.to_uppercase(),
            group_id: Some(GroupId::new(group)),
            quantity: 1,
            category_id: None,
            is_purchased: false,
            notes: None,
        }
    }

    fn category(id: &str) -> Category {
        Category {
            id: CategoryId::new(id),
            name: id.to_owned(),
            group_id: None,
            is_default: Some(true),
            sort_order: None,
            section: None,
            translation_key: None,
            icon: None,
        }
    }

    #[test]
    fn test_error_keeps_stale_items() {
        let mut list = ListState::Loaded(vec![shopping("s1", "g1")]);
        let stale = list.items().to_vec();
        list.fail("offline", stale);

        assert_eq!(list.error(), Some("offline"));
        assert_eq!(list.len(), 1);
        assert!(!list.is_loaded());
    }

    #[test]
    fn test_items_mut_promotes_empty() {
        let mut list: ListState<ShoppingItem> = ListState::Empty;
        list.items_mut().push(shopping("s1", "g1"));
        assert!(list.is_loaded());
    }

    #[test]
    fn test_remove_then_restore_keeps_position() {
        let mut list = ListState::Loaded(vec![
            shopping("s1", "g1"),
            shopping("s2", "g1"),
            shopping("s3", "g1"),
        ]);

        let (index, removed) = list.remove(&ShoppingItemId::new("s2")).unwrap();
        assert_eq!(index, 1);
        assert_eq!(list.len(), 2);

        list.restore(index, removed);
        let ids: Vec<_> = list.items().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["s1", "s2", "s3"]);
    }

    #[test]
    fn test_restore_skips_reappeared_entry() {
        let mut list = ListState::Loaded(vec![shopping("s1", "g1")]);
        list.restore(0, shopping("s1", "g1"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_update_returns_new_value() {
        let mut list = ListState::Loaded(vec![shopping("s1", "g1")]);
        let updated = list
            .update(&ShoppingItemId::new("s1"), |s| s.is_purchased = true)
            .unwrap();
        assert!(updated.is_purchased);
        assert!(list.items()[0].is_purchased);
        assert!(list.update(&ShoppingItemId::new("nope"), |_| {}).is_none());
    }

    #[test]
    fn test_owned_by_filters_other_groups() {
        let list = ListState::Loaded(vec![shopping("s1", "g1"), shopping("s2", "g2")]);
        let owned = list.owned_by(&GroupId::new("g1"));
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].id.as_str(), "s1");

        let wishes: ListState<WishItem> = ListState::Empty;
        assert!(wishes.owned_by(&GroupId::new("g1")).is_empty());
        assert!(wishes.get(&WishItemId::new("w1")).is_none());
    }

    #[test]
    fn test_empty_selection_shows_everything() {
        let mut state = StoreState {
            categories: ListState::Loaded(vec![category("c1"), category("c2")]),
            ..StoreState::default()
        };
        assert_eq!(state.visible_categories().len(), 2);

        state.selected_categories.insert(CategoryId::new("c2"));
        let visible = state.visible_categories();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id.as_str(), "c2");
    }
}
