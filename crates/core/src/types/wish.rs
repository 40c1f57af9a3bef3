//! Wish list entries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Entity, GroupId, WishItemId};

/// Something the group would like to acquire eventually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishItem {
    pub id: WishItemId,
    pub name: String,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    /// Expected price. Accepts both JSON numbers and strings.
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Product page link.
    #[serde(default)]
    pub url: Option<String>,
    /// Marked as obtained.
    #[serde(default)]
    pub is_fulfilled: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Entity for WishItem {
    type Id = WishItemId;

    const KIND: &'static str = "wish";

    fn id(&self) -> &WishItemId {
        &self.id
    }

    fn group_id(&self) -> Option<&GroupId> {
        self.group_id.as_ref()
    }
}

/// Body for creating or updating a wish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishItemInput {
    pub name: String,
    pub group_id: GroupId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub is_fulfilled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl WishItemInput {
    /// A new, unfulfilled wish.
    #[must_use]
    pub fn new(group_id: GroupId, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group_id,
            price: None,
            url: None,
            is_fulfilled: false,
            notes: None,
        }
    }

    /// Rebuild the full update body for an existing wish.
    #[must_use]
    pub fn from_item(item: &WishItem) -> Option<Self> {
        Some(Self {
            name: item.name.clone(),
            group_id: item.group_id.clone()?,
            price: item.price,
            url: item.url.clone(),
            is_fulfilled: item.is_fulfilled,
            notes: item.notes.clone(),
        })
    }
}
