//! In-memory [`InventoryApi`] for store tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use stockpile_core::{
    Category, CategoryId, CategoryInput, Entity, Group, GroupId, GroupInput, InventoryItem,
    InventoryItemInput, ItemId, Location, LocationId, LocationInput, ShoppingItem,
    ShoppingItemId, ShoppingItemInput, WishItem, WishItemId, WishItemInput,
};

use super::SyncStore;
use crate::api::{ImageUpload, InventoryApi};
use crate::pipeline::ApiError;
use crate::session::SessionManager;
use crate::storage::{MemoryCredentialStore, MemoryPreferenceStore, PreferenceStore};

/// Server-side data plus failure injection and a call log.
#[derive(Default)]
pub(crate) struct FakeApi {
    pub groups: Mutex<Vec<Group>>,
    pub default_categories: Mutex<Vec<Category>>,
    pub group_categories: Mutex<Vec<Category>>,
    pub default_locations: Mutex<Vec<Location>>,
    pub group_locations: Mutex<Vec<Location>>,
    pub items: Mutex<Vec<InventoryItem>>,
    pub shopping: Mutex<Vec<ShoppingItem>>,
    pub wishes: Mutex<Vec<WishItem>>,
    failing: Mutex<HashSet<&'static str>>,
    delays: Mutex<HashMap<&'static str, Duration>>,
    group_delays: Mutex<HashMap<GroupId, Duration>>,
    calls: Mutex<Vec<String>>,
    next_id: AtomicUsize,
}

#[allow(clippy::unwrap_used)]
impl FakeApi {
    /// Two groups with catalogs and one entry per list in `g1`.
    pub fn seeded() -> Arc<Self> {
        let api = Self::default();
        *api.groups.lock().unwrap() = vec![group("g1", "Home"), group("g2", "Cabin")];
        *api.default_categories.lock().unwrap() = vec![
            category("c1", "Dairy", None, Some(true), Some(1)),
            category("c2", "Produce", None, Some(true), Some(2)),
        ];
        *api.group_categories.lock().unwrap() = vec![
            category("c9", "Snacks", Some("g1"), Some(false), None),
            category("c8", "Cabin Stuff", Some("g2"), Some(false), None),
        ];
        *api.default_locations.lock().unwrap() =
            vec![location("l1", "Fridge", None, Some(true), Some(1))];
        *api.group_locations.lock().unwrap() =
            vec![location("l9", "Garage", Some("g1"), Some(false), None)];
        *api.items.lock().unwrap() = vec![
            item("i1", "Milk", "g1"),
            item("i2", "Firewood", "g2"),
        ];
        *api.shopping.lock().unwrap() = vec![shopping("s1", "Eggs", "g1")];
        *api.wishes.lock().unwrap() = vec![wish("w1", "Kettle", "g1")];
        Arc::new(api)
    }

    /// Make every call to `op` fail with a 500.
    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn heal(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    /// Delay every call to `op`.
    pub fn delay(&self, op: &'static str, delay: Duration) {
        self.delays.lock().unwrap().insert(op, delay);
    }

    /// Delay group-scoped list calls for one group.
    pub fn delay_group(&self, group_id: &str, delay: Duration) {
        self.group_delays
            .lock()
            .unwrap()
            .insert(GroupId::new(group_id), delay);
    }

    /// Names of the calls made so far, in order of arrival.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls().iter().filter(|call| call.as_str() == op).count()
    }

    async fn enter(&self, op: &'static str, group_id: Option<&GroupId>) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(op.to_owned());
        let delay = self.delays.lock().unwrap().get(op).copied();
        let group_delay =
            group_id.and_then(|id| self.group_delays.lock().unwrap().get(id).copied());
        if let Some(delay) = delay.or(group_delay) {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(op) {
            return Err(ApiError::Server {
                status: 500,
                message: format!("{op} failed"),
            });
        }
        Ok(())
    }

    fn new_id(&self, prefix: &str) -> String {
        format!("{prefix}-new-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[allow(clippy::unwrap_used)]
#[async_trait]
impl InventoryApi for FakeApi {
    async fn list_groups(&self) -> Result<Vec<Group>, ApiError> {
        self.enter("list_groups", None).await?;
        Ok(self.groups.lock().unwrap().clone())
    }

    async fn create_group(&self, input: &GroupInput) -> Result<Group, ApiError> {
        self.enter("create_group", None).await?;
        let created = group(&self.new_id("g"), &input.name);
        self.groups.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_group(&self, id: &GroupId, input: &GroupInput) -> Result<Group, ApiError> {
        self.enter("update_group", None).await?;
        Ok(group(id.as_str(), &input.name))
    }

    async fn delete_group(&self, id: &GroupId) -> Result<Option<Group>, ApiError> {
        self.enter("delete_group", None).await?;
        Ok(take(&self.groups, id))
    }

    async fn join_group(&self, invite_code: &str) -> Result<Group, ApiError> {
        self.enter("join_group", None).await?;
        let joined = group("g-joined", invite_code);
        self.groups.lock().unwrap().push(joined.clone());
        Ok(joined)
    }

    async fn list_categories(
        &self,
        group_id: Option<&GroupId>,
    ) -> Result<Vec<Category>, ApiError> {
        match group_id {
            None => {
                self.enter("list_default_categories", None).await?;
                Ok(self.default_categories.lock().unwrap().clone())
            }
            Some(id) => {
                self.enter("list_group_categories", Some(id)).await?;
                Ok(owned(&self.group_categories.lock().unwrap(), id, |c| {
                    c.group_id.as_ref()
                }))
            }
        }
    }

    async fn create_category(&self, input: &CategoryInput) -> Result<Category, ApiError> {
        self.enter("create_category", None).await?;
        let mut created = category(
            &self.new_id("c"),
            &input.name,
            None,
            Some(false),
            input.sort_order,
        );
        created.group_id.clone_from(&input.group_id);
        Ok(created)
    }

    async fn update_category(
        &self,
        id: &CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        self.enter("update_category", None).await?;
        let mut updated = category(id.as_str(), &input.name, None, Some(false), input.sort_order);
        updated.group_id.clone_from(&input.group_id);
        Ok(updated)
    }

    async fn delete_category(&self, id: &CategoryId) -> Result<Option<Category>, ApiError> {
        self.enter("delete_category", None).await?;
        Ok(take(&self.group_categories, id).or_else(|| take(&self.default_categories, id)))
    }

    async fn list_locations(
        &self,
        group_id: Option<&GroupId>,
    ) -> Result<Vec<Location>, ApiError> {
        match group_id {
            None => {
                self.enter("list_default_locations", None).await?;
                Ok(self.default_locations.lock().unwrap().clone())
            }
            Some(id) => {
                self.enter("list_group_locations", Some(id)).await?;
                Ok(owned(&self.group_locations.lock().unwrap(), id, |l| {
                    l.group_id.as_ref()
                }))
            }
        }
    }

    async fn create_location(&self, input: &LocationInput) -> Result<Location, ApiError> {
        self.enter("create_location", None).await?;
        let mut created = location(
            &self.new_id("l"),
            &input.name,
            None,
            Some(false),
            input.sort_order,
        );
        created.group_id.clone_from(&input.group_id);
        Ok(created)
    }

    async fn update_location(
        &self,
        id: &LocationId,
        input: &LocationInput,
    ) -> Result<Location, ApiError> {
        self.enter("update_location", None).await?;
        let mut updated = location(id.as_str(), &input.name, None, Some(false), input.sort_order);
        updated.group_id.clone_from(&input.group_id);
        Ok(updated)
    }

    async fn delete_location(&self, id: &LocationId) -> Result<Option<Location>, ApiError> {
        self.enter("delete_location", None).await?;
        Ok(take(&self.group_locations, id).or_else(|| take(&self.default_locations, id)))
    }

    async fn list_items(&self, group_id: &GroupId) -> Result<Vec<InventoryItem>, ApiError> {
        self.enter("list_items", Some(group_id)).await?;
        Ok(owned(&self.items.lock().unwrap(), group_id, |i| {
            i.group_id.as_ref()
        }))
    }

    async fn create_item(&self, input: &InventoryItemInput) -> Result<InventoryItem, ApiError> {
        self.enter("create_item", None).await?;
        let mut created = item(&self.new_id("i"), &input.name, input.group_id.as_str());
        created.quantity = input.quantity;
        Ok(created)
    }

    async fn update_item(
        &self,
        id: &ItemId,
        input: &InventoryItemInput,
    ) -> Result<InventoryItem, ApiError> {
        self.enter("update_item", None).await?;
        let mut updated = item(id.as_str(), &input.name, input.group_id.as_str());
        updated.quantity = input.quantity;
        updated.notes = Some("saved".to_owned());
        Ok(updated)
    }

    async fn delete_item(&self, id: &ItemId) -> Result<Option<InventoryItem>, ApiError> {
        self.enter("delete_item", None).await?;
        Ok(take(&self.items, id))
    }

    async fn upload_item_image(
        &self,
        id: &ItemId,
        image: ImageUpload,
    ) -> Result<InventoryItem, ApiError> {
        self.enter("upload_item_image", None).await?;
        let mut updated = self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|i| &i.id == id)
            .cloned()
            .ok_or_else(|| ApiError::Server {
                status: 404,
                message: "Item not found".to_owned(),
            })?;
        updated.image_url = Some(format!("https://cdn.example.com/{}", image.file_name));
        Ok(updated)
    }

    async fn list_shopping(&self, group_id: &GroupId) -> Result<Vec<ShoppingItem>, ApiError> {
        self.enter("list_shopping", Some(group_id)).await?;
        Ok(owned(&self.shopping.lock().unwrap(), group_id, |s| {
            s.group_id.as_ref()
        }))
    }

    async fn create_shopping_item(
        &self,
        input: &ShoppingItemInput,
    ) -> Result<ShoppingItem, ApiError> {
        self.enter("create_shopping_item", None).await?;
        let mut created = shopping(&self.new_id("s"), &input.name, input.group_id.as_str());
        created.quantity = input.quantity;
        created.is_purchased = input.is_purchased;
        Ok(created)
    }

    async fn update_shopping_item(
        &self,
        id: &ShoppingItemId,
        input: &ShoppingItemInput,
    ) -> Result<ShoppingItem, ApiError> {
        self.enter("update_shopping_item", None).await?;
        let mut updated = shopping(id.as_str(), &input.name, input.group_id.as_str());
        updated.quantity = input.quantity;
        updated.is_purchased = input.is_purchased;
        updated.notes = Some("server copy".to_owned());
        Ok(updated)
    }

    async fn delete_shopping_item(
        &self,
        id: &ShoppingItemId,
    ) -> Result<Option<ShoppingItem>, ApiError> {
        self.enter("delete_shopping_item", None).await?;
        Ok(take(&self.shopping, id))
    }

    async fn list_wishes(&self, group_id: &GroupId) -> Result<Vec<WishItem>, ApiError> {
        self.enter("list_wishes", Some(group_id)).await?;
        Ok(owned(&self.wishes.lock().unwrap(), group_id, |w| {
            w.group_id.as_ref()
        }))
    }

    async fn create_wish(&self, input: &WishItemInput) -> Result<WishItem, ApiError> {
        self.enter("create_wish", None).await?;
        Ok(wish(&self.new_id("w"), &input.name, input.group_id.as_str()))
    }

    async fn update_wish(
        &self,
        id: &WishItemId,
        input: &WishItemInput,
    ) -> Result<WishItem, ApiError> {
        self.enter("update_wish", None).await?;
        let mut updated = wish(id.as_str(), &input.name, input.group_id.as_str());
        updated.is_fulfilled = input.is_fulfilled;
        updated.price = input.price;
        Ok(updated)
    }

    async fn delete_wish(&self, id: &WishItemId) -> Result<Option<WishItem>, ApiError> {
        self.enter("delete_wish", None).await?;
        Ok(take(&self.wishes, id))
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.enter("logout", None).await
    }
}

/// A store over `api` with a signed-in in-memory session.
pub(crate) fn store_with(api: &Arc<FakeApi>) -> (SyncStore, SessionManager) {
    store_with_preferences(api, &Arc::new(MemoryPreferenceStore::new()))
}

/// Like [`store_with`], keeping preferences in `preferences`.
#[allow(clippy::unwrap_used)]
pub(crate) fn store_with_preferences(
    api: &Arc<FakeApi>,
    preferences: &Arc<MemoryPreferenceStore>,
) -> (SyncStore, SessionManager) {
    let session = SessionManager::new(Arc::new(MemoryCredentialStore::new()));
    session
        .save(
            &stockpile_core::TokenPair {
                access_token: "a1".to_owned(),
                refresh_token: "r1".to_owned(),
            },
            None,
        )
        .unwrap();
    let store = SyncStore::new(
        Arc::clone(api) as Arc<dyn InventoryApi>,
        Arc::clone(preferences) as Arc<dyn PreferenceStore>,
        session.clone(),
    );
    (store, session)
}

fn owned<T: Clone>(
    entries: &[T],
    group_id: &GroupId,
    owner: impl Fn(&T) -> Option<&GroupId>,
) -> Vec<T> {
    entries
        .iter()
        .filter(|entry| owner(entry) == Some(group_id))
        .cloned()
        .collect()
}

/// Remove and return the entry with `id`, as the server echoes it.
#[allow(clippy::unwrap_used)]
fn take<T: Entity>(entries: &Mutex<Vec<T>>, id: &T::Id) -> Option<T> {
    let mut entries = entries.lock().unwrap();
    let index = entries.iter().position(|entry| entry.id() == id)?;
    Some(entries.remove(index))
}

pub(crate) fn group(id: &str, name: &str) -> Group {
    Group {
        id: GroupId::new(id),
        name: name.to_owned(),
        invite_code: None,
        owner_id: None,
        created_at: None,
    }
}

pub(crate) fn category(
    id: &str,
    name: &str,
    group_id: Option<&str>,
    is_default: Option<bool>,
    sort_order: Option<i32>,
) -> Category {
    Category {
        id: CategoryId::new(id),
        name: name.to_owned(),
        group_id: group_id.map(GroupId::new),
        is_default,
        sort_order,
        section: None,
        translation_key: None,
        icon: None,
    }
}

pub(crate) fn location(
    id: &str,
    name: &str,
    group_id: Option<&str>,
    is_default: Option<bool>,
    sort_order: Option<i32>,
) -> Location {
    Location {
        id: LocationId::new(id),
        name: name.to_owned(),
        group_id: group_id.map(GroupId::new),
        is_default,
        sort_order,
        section: None,
        translation_key: None,
    }
}

pub(crate) fn item(id: &str, name: &str, group_id: &str) -> InventoryItem {
    InventoryItem {
        id: ItemId::new(id),
        name: name.to_owned(),
        group_id: Some(GroupId::new(group_id)),
        quantity: 1,
        unit: None,
        category_id: None,
        location_id: None,
        expiration_date: None,
        notes: None,
        image_url: None,
        created_at: None,
        updated_at: None,
    }
}

pub(crate) fn shopping(id: &str, name: &str, group_id: &str) -> ShoppingItem {
    ShoppingItem {
        id: ShoppingItemId::new(id),
        name: name.to_owned(),
        group_id: Some(GroupId::new(group_id)),
        quantity: 1,
        category_id: None,
        is_purchased: false,
        notes: None,
    }
}

pub(crate) fn wish(id: &str, name: &str, group_id: &str) -> WishItem {
    WishItem {
        id: WishItemId::new(id),
        name: name.to_owned(),
        group_id: Some(GroupId::new(group_id)),
        price: None,
        url: None,
        is_fulfilled: false,
        notes: None,
    }
}
