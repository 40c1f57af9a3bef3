//! Typed client for the Stockpile REST service.
//!
//! One method per resource operation. Each builds a [`RequestSpec`], runs
//! it through the [`RequestPipeline`] and unwraps the response envelope, so
//! callers only ever see domain records.
//!
//! # Resources
//!
//! - **Auth**: login, register, logout (see [`ApiClient::login`])
//! - **Groups**: list, create, rename, delete, join by invite code
//! - **Catalogs**: categories and locations, default or group-scoped
//! - **Lists**: inventory items (with image upload), shopping, wishes
//!
//! The state store consumes this through the [`InventoryApi`] trait so it
//! can be driven by fakes in tests.

mod auth;
mod catalog;
mod groups;
mod lists;
mod types;

pub use auth::AuthError;
pub use types::*;

use std::sync::Arc;

use async_trait::async_trait;
use stockpile_core::{
    Category, CategoryId, CategoryInput, Group, GroupId, GroupInput, InventoryItem,
    InventoryItemInput, ItemId, Location, LocationId, LocationInput, ShoppingItem,
    ShoppingItemId, ShoppingItemInput, WishItem, WishItemId, WishItemInput,
};

use crate::pipeline::{ApiError, RequestPipeline};
use crate::session::SessionManager;

/// Stockpile REST client.
#[derive(Clone, Debug)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

#[derive(Debug)]
struct ApiClientInner {
    pipeline: RequestPipeline,
}

impl ApiClient {
    #[must_use]
    pub fn new(pipeline: RequestPipeline) -> Self {
        Self {
            inner: Arc::new(ApiClientInner { pipeline }),
        }
    }

    /// The underlying request pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &RequestPipeline {
        &self.inner.pipeline
    }

    /// The session the pipeline authenticates with.
    #[must_use]
    pub fn session(&self) -> &SessionManager {
        self.inner.pipeline.session()
    }
}

/// Remote operations the state store depends on.
///
/// Every create and update returns the server's canonical record; deletes
/// return it when the response echoes one. List operations for
/// catalogs take an optional group: `None` requests the global defaults.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    async fn list_groups(&self) -> Result<Vec<Group>, ApiError>;
    async fn create_group(&self, input: &GroupInput) -> Result<Group, ApiError>;
    async fn update_group(&self, id: &GroupId, input: &GroupInput) -> Result<Group, ApiError>;
    async fn delete_group(&self, id: &GroupId) -> Result<Option<Group>, ApiError>;
    async fn join_group(&self, invite_code: &str) -> Result<Group, ApiError>;

    async fn list_categories(&self, group_id: Option<&GroupId>)
    -> Result<Vec<Category>, ApiError>;
    async fn create_category(&self, input: &CategoryInput) -> Result<Category, ApiError>;
    async fn update_category(
        &self,
        id: &CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, ApiError>;
    async fn delete_category(&self, id: &CategoryId) -> Result<Option<Category>, ApiError>;

    async fn list_locations(&self, group_id: Option<&GroupId>)
    -> Result<Vec<Location>, ApiError>;
    async fn create_location(&self, input: &LocationInput) -> Result<Location, ApiError>;
    async fn update_location(
        &self,
        id: &LocationId,
        input: &LocationInput,
    ) -> Result<Location, ApiError>;
    async fn delete_location(&self, id: &LocationId) -> Result<Option<Location>, ApiError>;

    async fn list_items(&self, group_id: &GroupId) -> Result<Vec<InventoryItem>, ApiError>;
    async fn create_item(&self, input: &InventoryItemInput) -> Result<InventoryItem, ApiError>;
    async fn update_item(
        &self,
        id: &ItemId,
        input: &InventoryItemInput,
    ) -> Result<InventoryItem, ApiError>;
    async fn delete_item(&self, id: &ItemId) -> Result<Option<InventoryItem>, ApiError>;
    async fn upload_item_image(
        &self,
        id: &ItemId,
        image: ImageUpload,
    ) -> Result<InventoryItem, ApiError>;

    async fn list_shopping(&self, group_id: &GroupId) -> Result<Vec<ShoppingItem>, ApiError>;
    async fn create_shopping_item(
        &self,
        input: &ShoppingItemInput,
    ) -> Result<ShoppingItem, ApiError>;
    async fn update_shopping_item(
        &self,
        id: &ShoppingItemId,
        input: &ShoppingItemInput,
    ) -> Result<ShoppingItem, ApiError>;
    async fn delete_shopping_item(&self, id: &ShoppingItemId) -> Result<Option<ShoppingItem>, ApiError>;

    async fn list_wishes(&self, group_id: &GroupId) -> Result<Vec<WishItem>, ApiError>;
    async fn create_wish(&self, input: &WishItemInput) -> Result<WishItem, ApiError>;
    async fn update_wish(&self, id: &WishItemId, input: &WishItemInput)
    -> Result<WishItem, ApiError>;
    async fn delete_wish(&self, id: &WishItemId) -> Result<Option<WishItem>, ApiError>;

    /// Revoke the current session server-side.
    async fn logout(&self) -> Result<(), ApiError>;
}

#[async_trait]
impl InventoryApi for ApiClient {
    async fn list_groups(&self) -> Result<Vec<Group>, ApiError> {
        Self::list_groups(self).await
    }

    async fn create_group(&self, input: &GroupInput) -> Result<Group, ApiError> {
        Self::create_group(self, input).await
    }

    async fn update_group(&self, id: &GroupId, input: &GroupInput) -> Result<Group, ApiError> {
        Self::update_group(self, id, input).await
    }

    async fn delete_group(&self, id: &GroupId) -> Result<Option<Group>, ApiError> {
        Self::delete_group(self, id).await
    }

    async fn join_group(&self, invite_code: &str) -> Result<Group, ApiError> {
        Self::join_group(self, invite_code).await
    }

    async fn list_categories(
        &self,
        group_id: Option<&GroupId>,
    ) -> Result<Vec<Category>, ApiError> {
        Self::list_categories(self, group_id).await
    }

    async fn create_category(&self, input: &CategoryInput) -> Result<Category, ApiError> {
        Self::create_category(self, input).await
    }

    async fn update_category(
        &self,
        id: &CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        Self::update_category(self, id, input).await
    }

    async fn delete_category(&self, id: &CategoryId) -> Result<Option<Category>, ApiError> {
        Self::delete_category(self, id).await
    }

    async fn list_locations(
        &self,
        group_id: Option<&GroupId>,
    ) -> Result<Vec<Location>, ApiError> {
        Self::list_locations(self, group_id).await
    }

    async fn create_location(&self, input: &LocationInput) -> Result<Location, ApiError> {
        Self::create_location(self, input).await
    }

    async fn update_location(
        &self,
        id: &LocationId,
        input: &LocationInput,
    ) -> Result<Location, ApiError> {
        Self::update_location(self, id, input).await
    }

    async fn delete_location(&self, id: &LocationId) -> Result<Option<Location>, ApiError> {
        Self::delete_location(self, id).await
    }

    async fn list_items(&self, group_id: &GroupId) -> Result<Vec<InventoryItem>, ApiError> {
        Self::list_items(self, group_id).await
    }

    async fn create_item(&self, input: &InventoryItemInput) -> Result<InventoryItem, ApiError> {
        Self::create_item(self, input).await
    }

    async fn update_item(
        &self,
        id: &ItemId,
        input: &InventoryItemInput,
    ) -> Result<InventoryItem, ApiError> {
        Self::update_item(self, id, input).await
    }

    async fn delete_item(&self, id: &ItemId) -> Result<Option<InventoryItem>, ApiError> {
        Self::delete_item(self, id).await
    }

    async fn upload_item_image(
        &self,
        id: &ItemId,
        image: ImageUpload,
    ) -> Result<InventoryItem, ApiError> {
        Self::upload_item_image(self, id, image).await
    }

    async fn list_shopping(&self, group_id: &GroupId) -> Result<Vec<ShoppingItem>, ApiError> {
        Self::list_shopping(self, group_id).await
    }

    async fn create_shopping_item(
        &self,
        input: &ShoppingItemInput,
    ) -> Result<ShoppingItem, ApiError> {
        Self::create_shopping_item(self, input).await
    }

    async fn update_shopping_item(
        &self,
        id: &ShoppingItemId,
        input: &ShoppingItemInput,
    ) -> Result<ShoppingItem, ApiError> {
        Self::update_shopping_item(self, id, input).await
    }

    async fn delete_shopping_item(&self, id: &ShoppingItemId) -> Result<Option<ShoppingItem>, ApiError> {
        Self::delete_shopping_item(self, id).await
    }

    async fn list_wishes(&self, group_id: &GroupId) -> Result<Vec<WishItem>, ApiError> {
        Self::list_wishes(self, group_id).await
    }

    async fn create_wish(&self, input: &WishItemInput) -> Result<WishItem, ApiError> {
        Self::create_wish(self, input).await
    }

    async fn update_wish(
        &self,
        id: &WishItemId,
        input: &WishItemInput,
    ) -> Result<WishItem, ApiError> {
        Self::update_wish(self, id, input).await
    }

    async fn delete_wish(&self, id: &WishItemId) -> Result<Option<WishItem>, ApiError> {
        Self::delete_wish(self, id).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        Self::logout(self).await
    }
}
