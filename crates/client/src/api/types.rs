//! Wire envelopes and request payloads for the REST service.

use serde::{Deserialize, Serialize};
use stockpile_core::{Category, Group, InventoryItem, Location, ShoppingItem, WishItem};

/// An image to attach to an inventory item.
#[derive(Clone)]
pub struct ImageUpload {
    pub file_name: String,
    /// MIME type, e.g. `image/jpeg`.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageUpload {
    /// Guess the content type from the file extension.
    #[must_use]
    pub fn from_file_name(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let content_type = match extension.as_str() {
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "heic" => "image/heic",
            _ => "image/jpeg",
        };
        Self {
            file_name,
            content_type: content_type.to_owned(),
            bytes,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JoinGroupRequest<'a> {
    pub invite_code: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct GroupsEnvelope {
    pub groups: Vec<Group>,
}

#[derive(Deserialize)]
pub(crate) struct GroupEnvelope {
    pub group: Group,
}

/// Delete responses may echo the removed record, or carry no body at all.
#[derive(Deserialize)]
pub(crate) struct DeletedGroupEnvelope {
    #[serde(default)]
    pub group: Option<Group>,
}

#[derive(Deserialize)]
pub(crate) struct CategoriesEnvelope {
    pub categories: Vec<Category>,
}

#[derive(Deserialize)]
pub(crate) struct CategoryEnvelope {
    pub category: Category,
}

#[derive(Deserialize)]
pub(crate) struct DeletedCategoryEnvelope {
    #[serde(default)]
    pub category: Option<Category>,
}

#[derive(Deserialize)]
pub(crate) struct LocationsEnvelope {
    pub locations: Vec<Location>,
}

#[derive(Deserialize)]
pub(crate) struct LocationEnvelope {
    pub location: Location,
}

#[derive(Deserialize)]
pub(crate) struct DeletedLocationEnvelope {
    #[serde(default)]
    pub location: Option<Location>,
}

/// Shared by the inventory and shopping endpoints.
#[derive(Deserialize)]
pub(crate) struct ItemsEnvelope<T> {
    pub items: Vec<T>,
}

#[derive(Deserialize)]
pub(crate) struct ItemEnvelope<T> {
    pub item: T,
}

#[derive(Deserialize)]
pub(crate) struct DeletedItemEnvelope<T> {
    #[serde(default = "Option::default")]
    pub item: Option<T>,
}

pub(crate) type InventoryItemsEnvelope = ItemsEnvelope<InventoryItem>;
pub(crate) type ShoppingItemsEnvelope = ItemsEnvelope<ShoppingItem>;

#[derive(Deserialize)]
pub(crate) struct WishesEnvelope {
    pub wishes: Vec<WishItem>,
}

#[derive(Deserialize)]
pub(crate) struct WishEnvelope {
    pub wish: WishItem,
}

#[derive(Deserialize)]
pub(crate) struct DeletedWishEnvelope {
    #[serde(default)]
    pub wish: Option<WishItem>,
}
