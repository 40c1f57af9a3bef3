//! Inventory items.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{CategoryId, Entity, GroupId, ItemId, LocationId};

/// Something the group currently has on hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    /// Item identifier.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Owning group.
    #[serde(default)]
    pub group_id: Option<GroupId>,
    /// Units on hand.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Free-form unit label ("kg", "cans").
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub location_id: Option<LocationId>,
    /// Best-before date.
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Server-hosted photo, set by the image upload endpoint.
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

const fn default_quantity() -> u32 {
    1
}

impl InventoryItem {
    /// Whether the item is past its expiration date on `today`.
    #[must_use]
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiration_date.is_some_and(|date| date < today)
    }

    /// Whether the item expires within `days` days of `today` (inclusive),
    /// without already being expired.
    #[must_use]
    pub fn expires_within(&self, today: NaiveDate, days: u32) -> bool {
        self.expiration_date.is_some_and(|date| {
            date >= today && (date - today).num_days() <= i64::from(days)
        })
    }
}

impl Entity for InventoryItem {
    type Id = ItemId;

    const KIND: &'static str = "item";

    fn id(&self) -> &ItemId {
        &self.id
    }

    fn group_id(&self) -> Option<&GroupId> {
        self.group_id.as_ref()
    }
}

/// Body for creating or updating an inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemInput {
    pub name: String,
    pub group_id: GroupId,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<LocationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl InventoryItemInput {
    /// Minimal input: a name and quantity within a group.
    #[must_use]
    pub fn new(group_id: GroupId, name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            group_id,
            quantity,
            unit: None,
            category_id: None,
            location_id: None,
            expiration_date: None,
            notes: None,
        }
    }
}
