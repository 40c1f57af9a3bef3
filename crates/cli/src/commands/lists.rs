//! Shopping, inventory and wish lists of the active group.
//!
//! # Usage
//!
//! ```bash
//! stockpile shopping add "Eggs" -q 12
//! stockpile shopping toggle <id>
//! stockpile items list
//! stockpile wishes add "Kettle" --url https://example.com/kettle
//! ```

use stockpile_client::{ImageUpload, StoreError};
use stockpile_core::{
    GroupId, InventoryItemInput, ItemId, ShoppingItemId, ShoppingItemInput, WishItemId,
    WishItemInput,
};
use tracing::{info, warn};

use super::{CommandError, Context};

fn active_group(context: &Context) -> Result<GroupId, CommandError> {
    context
        .store
        .snapshot()
        .active_group_id
        .ok_or(CommandError::Store(StoreError::NoActiveGroup))
}

// =============================================================================
// Shopping
// =============================================================================

pub async fn shopping_list() -> Result<(), CommandError> {
    let context = Context::synced().await?;
    let state = context.store.snapshot();

    for item in state.shopping.items() {
        info!(
            id = %item.id,
            name = %item.name,
            quantity = item.quantity,
            purchased = item.is_purchased,
            "Shopping"
        );
    }
    if let Some(error) = state.shopping.error() {
        warn!(error, "Shopping list may be out of date");
    }
    Ok(())
}

pub async fn shopping_add(name: &str, quantity: u32) -> Result<(), CommandError> {
    let context = Context::synced().await?;
    let input = ShoppingItemInput::new(active_group(&context)?, name, quantity);

    let item = context.store.create_shopping_item(&input).await?;

    info!(id = %item.id, name = %item.name, "Added to shopping list");
    Ok(())
}

/// Flip the purchased mark.
pub async fn shopping_toggle(id: &str) -> Result<(), CommandError> {
    let context = Context::synced().await?;
    let item = context
        .store
        .toggle_shopping_item(&ShoppingItemId::new(id))
        .await?;

    info!(id, name = %item.name, purchased = item.is_purchased, "Toggled");
    Ok(())
}

pub async fn shopping_remove(id: &str) -> Result<(), CommandError> {
    let context = Context::synced().await?;
    context
        .store
        .delete_shopping_item(&ShoppingItemId::new(id))
        .await?;

    info!(id, "Removed from shopping list");
    Ok(())
}

// =============================================================================
// Inventory
// =============================================================================

pub async fn items_list() -> Result<(), CommandError> {
    let context = Context::synced().await?;
    let state = context.store.snapshot();

    for item in state.items.items() {
        info!(
            id = %item.id,
            name = %item.name,
            quantity = item.quantity,
            expires = ?item.expiration_date,
            "Item"
        );
    }
    if let Some(error) = state.items.error() {
        warn!(error, "Inventory may be out of date");
    }
    Ok(())
}

pub async fn items_add(name: &str, quantity: u32) -> Result<(), CommandError> {
    let context = Context::synced().await?;
    let input = InventoryItemInput::new(active_group(&context)?, name, quantity);

    let item = context.store.create_item(&input).await?;

    info!(id = %item.id, name = %item.name, "Added to inventory");
    Ok(())
}

pub async fn items_remove(id: &str) -> Result<(), CommandError> {
    let context = Context::synced().await?;
    context.store.delete_item(&ItemId::new(id)).await?;

    info!(id, "Removed from inventory");
    Ok(())
}

/// Upload a photo file for an item.
pub async fn items_photo(id: &str, path: &std::path::Path) -> Result<(), CommandError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| CommandError::Storage(e.into()))?;
    let file_name = path
        .file_name()
        .map_or_else(|| "photo.jpg".to_owned(), |n| n.to_string_lossy().into_owned());

    let context = Context::synced().await?;
    let item = context
        .store
        .upload_item_image(&ItemId::new(id), ImageUpload::from_file_name(file_name, bytes))
        .await?;

    info!(id, image_url = ?item.image_url, "Uploaded photo");
    Ok(())
}

// =============================================================================
// Wishes
// =============================================================================

pub async fn wishes_list() -> Result<(), CommandError> {
    let context = Context::synced().await?;
    let state = context.store.snapshot();

    for wish in state.wishes.items() {
        info!(
            id = %wish.id,
            name = %wish.name,
            price = ?wish.price,
            fulfilled = wish.is_fulfilled,
            "Wish"
        );
    }
    if let Some(error) = state.wishes.error() {
        warn!(error, "Wish list may be out of date");
    }
    Ok(())
}

pub async fn wishes_add(name: &str, url: Option<String>) -> Result<(), CommandError> {
    let context = Context::synced().await?;
    let mut input = WishItemInput::new(active_group(&context)?, name);
    input.url = url;

    let wish = context.store.create_wish(&input).await?;

    info!(id = %wish.id, name = %wish.name, "Added wish");
    Ok(())
}

/// Flip the fulfilled mark.
pub async fn wishes_toggle(id: &str) -> Result<(), CommandError> {
    let context = Context::synced().await?;
    let wish = context.store.toggle_wish(&WishItemId::new(id)).await?;

    info!(id, name = %wish.name, fulfilled = wish.is_fulfilled, "Toggled");
    Ok(())
}

pub async fn wishes_remove(id: &str) -> Result<(), CommandError> {
    let context = Context::synced().await?;
    context.store.delete_wish(&WishItemId::new(id)).await?;

    info!(id, "Removed wish");
    Ok(())
}
