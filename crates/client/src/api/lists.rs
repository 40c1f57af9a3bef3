//! Group-owned lists: inventory, shopping and wishes.

use stockpile_core::{
    GroupId, InventoryItem, InventoryItemInput, ItemId, ShoppingItem, ShoppingItemId,
    ShoppingItemInput, WishItem, WishItemId, WishItemInput,
};
use tracing::{debug, instrument};

use super::ApiClient;
use super::types::{
    DeletedItemEnvelope, DeletedWishEnvelope, ImageUpload, InventoryItemsEnvelope, ItemEnvelope,
    ShoppingItemsEnvelope, WishEnvelope, WishesEnvelope,
};
use crate::pipeline::{ApiError, RequestSpec};

impl ApiClient {
    // =========================================================================
    // Inventory
    // =========================================================================

    /// # Errors
    ///
    /// Returns the pipeline error if the request fails.
    #[instrument(skip(self), fields(group_id = %group_id))]
    pub async fn list_items(&self, group_id: &GroupId) -> Result<Vec<InventoryItem>, ApiError> {
        let spec = RequestSpec::get("items").group_scope(Some(group_id));
        let envelope: InventoryItemsEnvelope = self.pipeline().execute(spec).await?;
        debug!(count = envelope.items.len(), "Fetched inventory");
        Ok(envelope.items)
    }

    /// # Errors
    ///
    /// Returns the pipeline error if the request fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_item(&self, input: &InventoryItemInput) -> Result<InventoryItem, ApiError> {
        let spec = RequestSpec::post("items").json(input)?;
        let envelope: ItemEnvelope<InventoryItem> = self.pipeline().execute(spec).await?;
        Ok(envelope.item)
    }

    /// # Errors
    ///
    /// Returns the pipeline error if the request fails.
    #[instrument(skip(self, input), fields(item_id = %id))]
    pub async fn update_item(
        &self,
        id: &ItemId,
        input: &InventoryItemInput,
    ) -> Result<InventoryItem, ApiError> {
        let spec = RequestSpec::put("items").segment(id.as_str()).json(input)?;
        let envelope: ItemEnvelope<InventoryItem> = self.pipeline().execute(spec).await?;
        Ok(envelope.item)
    }

    /// # Errors
    ///
    /// Returns the pipeline error if the request fails.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn delete_item(&self, id: &ItemId) -> Result<Option<InventoryItem>, ApiError> {
        let spec = RequestSpec::delete("items").segment(id.as_str());
        let envelope: Option<DeletedItemEnvelope<InventoryItem>> =
            self.pipeline().execute(spec).await?;
        Ok(envelope.and_then(|e| e.item))
    }

    /// Attach a photo to an item. Returns the item with its new `image_url`.
    ///
    /// # Errors
    ///
    /// Returns the pipeline error if the upload fails.
    #[instrument(skip(self, image), fields(item_id = %id, bytes = image.bytes.len()))]
    pub async fn upload_item_image(
        &self,
        id: &ItemId,
        image: ImageUpload,
    ) -> Result<InventoryItem, ApiError> {
        let spec = RequestSpec::post("items")
            .segment(id.as_str())
            .segment("image")
            .image(image.file_name, image.content_type, image.bytes);
        let envelope: ItemEnvelope<InventoryItem> = self.pipeline().execute(spec).await?;
        Ok(envelope.item)
    }

    // =========================================================================
    // Shopping
    // =========================================================================

    /// # Errors
    ///
    /// Returns the pipeline error if the request fails.
    #[instrument(skip(self), fields(group_id = %group_id))]
    pub async fn list_shopping(&self, group_id: &GroupId) -> Result<Vec<ShoppingItem>, ApiError> {
        let spec = RequestSpec::get("shopping").group_scope(Some(group_id));
        let envelope: ShoppingItemsEnvelope = self.pipeline().execute(spec).await?;
        debug!(count = envelope.items.len(), "Fetched shopping list");
        Ok(envelope.items)
    }

    /// # Errors
    ///
    /// Returns the pipeline error if the request fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_shopping_item(
        &self,
        input: &ShoppingItemInput,
    ) -> Result<ShoppingItem, ApiError> {
        let spec = RequestSpec::post("shopping").json(input)?;
        let envelope: ItemEnvelope<ShoppingItem> = self.pipeline().execute(spec).await?;
        Ok(envelope.item)
    }

    /// # Errors
    ///
    /// Returns the pipeline error if the request fails.
    #[instrument(skip(self, input), fields(shopping_item_id = %id))]
    pub async fn update_shopping_item(
        &self,
        id: &ShoppingItemId,
        input: &ShoppingItemInput,
    ) -> Result<ShoppingItem, ApiError> {
        let spec = RequestSpec::put("shopping")
            .segment(id.as_str())
            .json(input)?;
        let envelope: ItemEnvelope<ShoppingItem> = self.pipeline().execute(spec).await?;
        Ok(envelope.item)
    }

    /// # Errors
    ///
    /// Returns the pipeline error if the request fails.
    #[instrument(skip(self), fields(shopping_item_id = %id))]
    pub async fn delete_shopping_item(
        &self,
        id: &ShoppingItemId,
    ) -> Result<Option<ShoppingItem>, ApiError> {
        let spec = RequestSpec::delete("shopping").segment(id.as_str());
        let envelope: Option<DeletedItemEnvelope<ShoppingItem>> =
            self.pipeline().execute(spec).await?;
        Ok(envelope.and_then(|e| e.item))
    }

    // =========================================================================
    // Wishes
    // =========================================================================

    /// # Errors
    ///
    /// Returns the pipeline error if the request fails.
    #[instrument(skip(self), fields(group_id = %group_id))]
    pub async fn list_wishes(&self, group_id: &GroupId) -> Result<Vec<WishItem>, ApiError> {
        let spec = RequestSpec::get("wishes").group_scope(Some(group_id));
        let envelope: WishesEnvelope = self.pipeline().execute(spec).await?;
        debug!(count = envelope.wishes.len(), "Fetched wishes");
        Ok(envelope.wishes)
    }

    /// # Errors
    ///
    /// Returns the pipeline error if the request fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_wish(&self, input: &WishItemInput) -> Result<WishItem, ApiError> {
        let spec = RequestSpec::post("wishes").json(input)?;
        let envelope: WishEnvelope = self.pipeline().execute(spec).await?;
        Ok(envelope.wish)
    }

    /// # Errors
    ///
    /// Returns the pipeline error if the request fails.
    #[instrument(skip(self, input), fields(wish_id = %id))]
    pub async fn update_wish(
        &self,
        id: &WishItemId,
        input: &WishItemInput,
    ) -> Result<WishItem, ApiError> {
        let spec = RequestSpec::put("wishes").segment(id.as_str()).json(input)?;
        let envelope: WishEnvelope = self.pipeline().execute(spec).await?;
        Ok(envelope.wish)
    }

    /// # Errors
    ///
    /// Returns the pipeline error if the request fails.
    #[instrument(skip(self), fields(wish_id = %id))]
    pub async fn delete_wish(&self, id: &WishItemId) -> Result<Option<WishItem>, ApiError> {
        let spec = RequestSpec::delete("wishes").segment(id.as_str());
        let envelope: Option<DeletedWishEnvelope> = self.pipeline().execute(spec).await?;
        Ok(envelope.and_then(|e| e.wish))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::test_support::client_for;

    #[tokio::test]
    async fn test_list_items_is_group_scoped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/items"))
            .and(query_param("groupId", "g1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    { "id": "i1", "name": "Milk", "groupId": "g1", "quantity": 2,
                      "expirationDate": "2026-10-21" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let items = client_for(&server)
            .list_items(&GroupId::new("g1"))
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        assert!(items[0].expiration_date.is_some());
    }

    #[tokio::test]
    async fn test_shopping_uses_items_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shopping"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{ "id": "s1", "name": "Eggs", "isPurchased": true }]
            })))
            .mount(&server)
            .await;

        let shopping = client_for(&server)
            .list_shopping(&GroupId::new("g1"))
            .await
            .unwrap();

        assert!(shopping[0].is_purchased);
        assert_eq!(shopping[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_update_shopping_item_sends_full_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/shopping/s1"))
            .and(body_partial_json(json!({ "isPurchased": true, "groupId": "g1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "item": { "id": "s1", "name": "Eggs", "groupId": "g1", "isPurchased": true }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut input = ShoppingItemInput::new(GroupId::new("g1"), "Eggs", 1);
        input.is_purchased = true;

        let updated = client_for(&server)
            .update_shopping_item(&ShoppingItemId::new("s1"), &input)
            .await
            .unwrap();
        assert!(updated.is_purchased);
    }

    #[tokio::test]
    async fn test_wish_envelope_and_price() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wishes"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "wish": { "id": "w1", "name": "Kettle", "groupId": "g1", "price": "39.50" }
            })))
            .mount(&server)
            .await;

        let wish = client_for(&server)
            .create_wish(&WishItemInput::new(GroupId::new("g1"), "Kettle"))
            .await
            .unwrap();

        assert_eq!(wish.price, Some(Decimal::new(3950, 2)));
    }

    #[tokio::test]
    async fn test_upload_item_image() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/items/i1/image"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "item": { "id": "i1", "name": "Milk", "imageUrl": "https://cdn.example.com/i1.jpg" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let item = client_for(&server)
            .upload_item_image(
                &ItemId::new("i1"),
                ImageUpload::from_file_name("milk.jpg", vec![0xFF, 0xD8]),
            )
            .await
            .unwrap();

        assert_eq!(item.image_url.as_deref(), Some("https://cdn.example.com/i1.jpg"));
    }
}
