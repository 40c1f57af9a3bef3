//! Group management.

use stockpile_core::{GroupId, GroupInput};
use tracing::info;

use super::{CommandError, Context};

/// List groups, marking the active one.
pub async fn list() -> Result<(), CommandError> {
    let context = Context::synced().await?;
    let state = context.store.snapshot();

    for group in state.groups.items() {
        let active = state.active_group_id.as_ref() == Some(&group.id);
        info!(id = %group.id, name = %group.name, active, "Group");
    }
    Ok(())
}

pub async fn create(name: &str) -> Result<(), CommandError> {
    let context = Context::synced().await?;
    let group = context
        .store
        .create_group(&GroupInput {
            name: name.to_owned(),
        })
        .await?;

    info!(id = %group.id, name = %group.name, "Created group");
    Ok(())
}

/// Make a group active; it stays active for later commands.
pub async fn switch(id: &str) -> Result<(), CommandError> {
    let context = Context::synced().await?;
    context.store.switch_group(&GroupId::new(id)).await?;

    let state = context.store.snapshot();
    info!(
        group = state.active_group().map_or(id, |g| g.name.as_str()),
        items = state.items.len(),
        shopping = state.shopping.len(),
        "Switched group"
    );
    Ok(())
}

pub async fn join(invite_code: &str) -> Result<(), CommandError> {
    let context = Context::synced().await?;
    let group = context.store.join_group(invite_code).await?;

    info!(id = %group.id, name = %group.name, "Joined group");
    Ok(())
}

pub async fn delete(id: &str) -> Result<(), CommandError> {
    let context = Context::synced().await?;
    context.store.delete_group(&GroupId::new(id)).await?;

    info!(id, "Deleted group");
    Ok(())
}
