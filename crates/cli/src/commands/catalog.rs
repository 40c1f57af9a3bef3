//! Category and location catalogs and their filters.

use stockpile_core::{CategoryId, LocationId};
use tracing::info;

use super::{CommandError, Context};

/// List visible categories; `all` ignores the selection filter.
pub async fn categories(all: bool) -> Result<(), CommandError> {
    let context = Context::synced().await?;
    let state = context.store.snapshot();

    let entries = if all {
        state.categories.items().iter().collect()
    } else {
        state.visible_categories()
    };
    for category in entries {
        let selected = state.selected_categories.contains(&category.id);
        info!(id = %category.id, name = %category.name, selected, "Category");
    }
    if let Some(error) = state.categories.error() {
        info!(error, "Categories may be out of date");
    }
    Ok(())
}

/// List visible locations; `all` ignores the selection filter.
pub async fn locations(all: bool) -> Result<(), CommandError> {
    let context = Context::synced().await?;
    let state = context.store.snapshot();

    let entries = if all {
        state.locations.items().iter().collect()
    } else {
        state.visible_locations()
    };
    for location in entries {
        let selected = state.selected_locations.contains(&location.id);
        info!(id = %location.id, name = %location.name, selected, "Location");
    }
    if let Some(error) = state.locations.error() {
        info!(error, "Locations may be out of date");
    }
    Ok(())
}

/// Toggle a category in the filter. Works offline.
pub fn select_category(id: &str) -> Result<(), CommandError> {
    let context = Context::from_env()?;
    context
        .store
        .toggle_category_selection(&CategoryId::new(id))?;

    let selected = context.store.snapshot().selected_categories.len();
    info!(id, selected, "Updated category filter");
    Ok(())
}

/// Toggle a location in the filter. Works offline.
pub fn select_location(id: &str) -> Result<(), CommandError> {
    let context = Context::from_env()?;
    context
        .store
        .toggle_location_selection(&LocationId::new(id))?;

    let selected = context.store.snapshot().selected_locations.len();
    info!(id, selected, "Updated location filter");
    Ok(())
}

pub fn clear_filters() -> Result<(), CommandError> {
    let context = Context::from_env()?;
    context.store.clear_category_selection()?;
    context.store.clear_location_selection()?;

    info!("Cleared filters");
    Ok(())
}
