//! Shopping list entries.

use serde::{Deserialize, Serialize};

use super::{CategoryId, Entity, GroupId, ShoppingItemId};

/// An entry on the group's shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingItem {
    pub id: ShoppingItemId,
    pub name: String,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Checked off in the store.
    #[serde(default)]
    pub is_purchased: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

const fn default_quantity() -> u32 {
    1
}

impl Entity for ShoppingItem {
    type Id = ShoppingItemId;

    const KIND: &'static str = "shopping item";

    fn id(&self) -> &ShoppingItemId {
        &self.id
    }

    fn group_id(&self) -> Option<&GroupId> {
        self.group_id.as_ref()
    }
}

/// Body for creating or updating a shopping list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingItemInput {
    pub name: String,
    pub group_id: GroupId,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    pub is_purchased: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ShoppingItemInput {
    /// A new, unpurchased entry.
    #[must_use]
    pub fn new(group_id: GroupId, name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            group_id,
            quantity,
            category_id: None,
            is_purchased: false,
            notes: None,
        }
    }

    /// Rebuild the full update body for an existing entry.
    ///
    /// Returns `None` when the entry has no owning group, which the server
    /// never produces for shopping items.
    #[must_use]
    pub fn from_item(item: &ShoppingItem) -> Option<Self> {
        Some(Self {
            name: item.name.clone(),
            group_id: item.group_id.clone()?,
            quantity: item.quantity,
            category_id: item.category_id.clone(),
            is_purchased: item.is_purchased,
            notes: item.notes.clone(),
        })
    }
}
