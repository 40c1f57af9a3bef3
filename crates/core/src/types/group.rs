//! Household groups.
//!
//! A group scopes every other entity: inventory, shopping and wish lists
//! belong to exactly one group, while categories and locations are either
//! global defaults or customizations owned by a group.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, GroupId, UserId};

/// A group of users sharing one inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Group identifier.
    pub id: GroupId,
    /// Display name.
    pub name: String,
    /// Code other users enter to join this group.
    #[serde(default)]
    pub invite_code: Option<String>,
    /// User who created the group.
    #[serde(default)]
    pub owner_id: Option<UserId>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Group {
    type Id = GroupId;

    const KIND: &'static str = "group";

    fn id(&self) -> &GroupId {
        &self.id
    }

    fn group_id(&self) -> Option<&GroupId> {
        Some(&self.id)
    }
}

/// Body for creating or renaming a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupInput {
    /// Display name.
    pub name: String,
}
