//! Integration tests for Stockpile.
//!
//! Every test drives the real client stack (request pipeline, session
//! manager, API client, store) against a `wiremock` server standing in for
//! the REST service.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p stockpile-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `sync_flow` - Two-phase loading, group switching, partial failures
//! - `token_refresh` - 401 handling and single-flight refresh
//! - `optimistic` - Optimistic mutations and rollback over HTTP
//! - `persistence` - File-backed credentials and preferences across restarts

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use stockpile_client::{
    ApiClient, ClientConfig, CredentialStore, FileCredentialStore, FilePreferenceStore,
    MemoryCredentialStore, MemoryPreferenceStore, PreferenceStore, RefreshPolicy, RequestPipeline,
    SessionManager, SyncStore,
};
use stockpile_core::TokenPair;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A client stack pointed at a fresh mock server.
pub struct TestContext {
    pub server: MockServer,
    pub session: SessionManager,
    pub api: ApiClient,
    pub store: SyncStore,
}

impl TestContext {
    /// Signed out, in-memory stores, shared refresh.
    pub async fn new() -> Self {
        Self::with_policy(RefreshPolicy::SharedAwait).await
    }

    pub async fn with_policy(policy: RefreshPolicy) -> Self {
        let server = MockServer::start().await;
        Self::build(
            server,
            policy,
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(MemoryPreferenceStore::new()),
        )
    }

    /// Signed in with the given access token and refresh token `r1`.
    pub async fn signed_in(access_token: &str) -> Self {
        let context = Self::new().await;
        context.sign_in(access_token);
        context
    }

    /// File-backed stores under `dir`, over an existing server.
    pub fn on_disk(server: MockServer, dir: &Path) -> Self {
        Self::build(
            server,
            RefreshPolicy::SharedAwait,
            Arc::new(FileCredentialStore::new(dir)),
            Arc::new(FilePreferenceStore::new(dir)),
        )
    }

    fn build(
        server: MockServer,
        policy: RefreshPolicy,
        credentials: Arc<dyn CredentialStore>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        let base_url = Url::parse(&server.uri()).expect("mock server uri");
        let config = ClientConfig::new(base_url)
            .with_timeouts(Duration::from_secs(2), Duration::from_secs(5))
            .with_refresh_policy(policy);
        let session = SessionManager::new(credentials);
        let pipeline = RequestPipeline::new(&config, session.clone()).expect("pipeline");
        let api = ApiClient::new(pipeline);
        let store = SyncStore::new(Arc::new(api.clone()), preferences, session.clone());
        Self {
            server,
            session,
            api,
            store,
        }
    }

    /// Store a token pair with refresh token `r1`.
    pub fn sign_in(&self, access_token: &str) {
        self.session
            .save(
                &TokenPair {
                    access_token: access_token.to_owned(),
                    refresh_token: "r1".to_owned(),
                },
                None,
            )
            .expect("save session");
    }

    /// Serve a complete, healthy data set for `group_id`.
    pub async fn mount_group(&self, group_id: &str, groups: Value) {
        mount_get(&self.server, "/groups", None, json!({ "groups": groups })).await;
        self.mount_group_lists(group_id).await;
    }

    /// Serve catalogs and lists for one group, without the group list.
    pub async fn mount_group_lists(&self, group_id: &str) {
        let server = &self.server;
        mount_get(
            server,
            "/categories",
            None,
            json!({ "categories": [category("c1", "Dairy", None, 1)] }),
        )
        .await;
        mount_get(
            server,
            "/categories",
            Some(group_id),
            json!({ "categories": [category(&format!("{group_id}-cat"), "Custom", Some(group_id), 5)] }),
        )
        .await;
        mount_get(
            server,
            "/locations",
            None,
            json!({ "locations": [{ "id": "l1", "name": "Fridge", "isDefault": true, "sortOrder": 1 }] }),
        )
        .await;
        mount_get(server, "/locations", Some(group_id), json!({ "locations": [] })).await;
        mount_get(
            server,
            "/items",
            Some(group_id),
            json!({ "items": [{ "id": format!("{group_id}-i1"), "name": "Milk", "groupId": group_id, "quantity": 2 }] }),
        )
        .await;
        mount_get(
            server,
            "/shopping",
            Some(group_id),
            json!({ "items": [{ "id": format!("{group_id}-s1"), "name": "Eggs", "groupId": group_id, "isPurchased": false }] }),
        )
        .await;
        mount_get(
            server,
            "/wishes",
            Some(group_id),
            json!({ "wishes": [{ "id": format!("{group_id}-w1"), "name": "Kettle", "groupId": group_id, "price": "39.90" }] }),
        )
        .await;
    }
}

/// Serve `body` for `GET path`, scoped to `group_id` when given.
///
/// An unscoped mock also matches scoped requests, so scoped mocks take
/// priority.
pub async fn mount_get(server: &MockServer, route: &str, group_id: Option<&str>, body: Value) {
    let builder = Mock::given(method("GET")).and(path(route));
    let (builder, priority) = match group_id {
        Some(id) => (builder.and(query_param("groupId", id)), 2),
        None => (builder, 5),
    };
    builder
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .with_priority(priority)
        .mount(server)
        .await;
}

pub fn group(id: &str, name: &str) -> Value {
    json!({ "id": id, "name": name })
}

pub fn category(id: &str, name: &str, group_id: Option<&str>, sort_order: i32) -> Value {
    json!({
        "id": id,
        "name": name,
        "groupId": group_id,
        "isDefault": group_id.is_none(),
        "sortOrder": sort_order,
    })
}

pub fn tokens(access_token: &str, refresh_token: &str) -> Value {
    json!({ "accessToken": access_token, "refreshToken": refresh_token })
}
