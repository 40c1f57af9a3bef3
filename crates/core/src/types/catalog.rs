//! Category and location catalogs.
//!
//! Both catalogs are assembled from two populations: global defaults (no
//! owning group) and customizations created inside the active group.
//! [`merge_catalog`] combines them into one deduplicated list with a
//! deterministic display order.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{CategoryId, Entity, GroupId, LocationId};

/// Shared view over catalog records used by the merge and ordering rules.
pub trait CatalogEntry: Entity {
    /// Display name.
    fn name(&self) -> &str;

    /// Whether the server marks this entry as a default.
    fn is_default(&self) -> Option<bool>;

    /// Explicit position; `None` sorts after every explicit value.
    fn sort_order(&self) -> Option<i32>;
}

/// An inventory category (e.g. "Dairy").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Category identifier.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Owning group; `None` for a global default.
    #[serde(default)]
    pub group_id: Option<GroupId>,
    /// Whether this is one of the built-in defaults.
    #[serde(default)]
    pub is_default: Option<bool>,
    /// Explicit display position.
    #[serde(default)]
    pub sort_order: Option<i32>,
    /// Display grouping label.
    #[serde(default)]
    pub section: Option<String>,
    /// Localization key for built-in names.
    #[serde(default)]
    pub translation_key: Option<String>,
    /// Icon name.
    #[serde(default)]
    pub icon: Option<String>,
}

/// A storage location (e.g. "Fridge").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Location identifier.
    pub id: LocationId,
    /// Display name.
    pub name: String,
    /// Owning group; `None` for a global default.
    #[serde(default)]
    pub group_id: Option<GroupId>,
    /// Whether this is one of the built-in defaults.
    #[serde(default)]
    pub is_default: Option<bool>,
    /// Explicit display position.
    #[serde(default)]
    pub sort_order: Option<i32>,
    /// Display grouping label.
    #[serde(default)]
    pub section: Option<String>,
    /// Localization key for built-in names.
    #[serde(default)]
    pub translation_key: Option<String>,
}

/// Body for creating or updating a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Body for creating or updating a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
}

impl Entity for Category {
    type Id = CategoryId;

    const KIND: &'static str = "category";

    fn id(&self) -> &CategoryId {
        &self.id
    }

    fn group_id(&self) -> Option<&GroupId> {
        self.group_id.as_ref()
    }
}

impl CatalogEntry for Category {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_default(&self) -> Option<bool> {
        self.is_default
    }

    fn sort_order(&self) -> Option<i32> {
        self.sort_order
    }
}

impl Entity for Location {
    type Id = LocationId;

    const KIND: &'static str = "location";

    fn id(&self) -> &LocationId {
        &self.id
    }

    fn group_id(&self) -> Option<&GroupId> {
        self.group_id.as_ref()
    }
}

impl CatalogEntry for Location {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_default(&self) -> Option<bool> {
        self.is_default
    }

    fn sort_order(&self) -> Option<i32> {
        self.sort_order
    }
}

/// Merge the default population with the active group's customizations.
///
/// Defaults come first and win id collisions: an id already seen (in
/// `defaults` or earlier in `group_items`) is skipped. The result is then
/// ordered with [`sort_catalog`].
///
/// Merging is idempotent, so `merge_catalog(x, x) == merge_catalog(x, &[])`.
#[must_use]
pub fn merge_catalog<T>(defaults: &[T], group_items: &[T]) -> Vec<T>
where
    T: CatalogEntry + Clone,
{
    let mut seen = HashSet::with_capacity(defaults.len() + group_items.len());

    let mut merged: Vec<T> = defaults
        .iter()
        .chain(group_items)
        .filter(|entry| seen.insert(entry.id().clone()))
        .cloned()
        .collect();

    sort_catalog(&mut merged);
    merged
}

/// Sort catalog entries into display order.
///
/// Defaults first, then ascending `sort_order` (missing values last), then
/// case-insensitive name. The sort is stable, so entries that compare equal
/// keep their relative order.
pub fn sort_catalog<T: CatalogEntry>(entries: &mut [T]) {
    entries.sort_by(catalog_order);
}

fn catalog_order<T: CatalogEntry>(a: &T, b: &T) -> Ordering {
    let a_default = a.is_default() == Some(true);
    let b_default = b.is_default() == Some(true);

    b_default
        .cmp(&a_default)
        .then_with(|| position_key(a).cmp(&position_key(b)))
        .then_with(|| compare_names(a.name(), b.name()))
}

/// `(missing, value)` so that any explicit position precedes a missing one.
fn position_key<T: CatalogEntry>(entry: &T) -> (bool, Option<i32>) {
    let order = entry.sort_order();
    (order.is_none(), order)
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}
