//! Integration tests for 401 recovery through the full client stack.
//!
//! The mock server rejects the stale token `a1` and accepts `a2`, which
//! `/auth/refresh` hands out.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use secrecy::ExposeSecret;
use serde_json::json;
use stockpile_client::{ApiError, RefreshPolicy, StoreError};
use stockpile_core::{GroupId, LoginRequest};
use stockpile_integration_tests::{TestContext, group, tokens};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn reject_stale_token(server: &MockServer) {
    Mock::given(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(401))
        .with_priority(1)
        .mount(server)
        .await;
}

async fn serve_refresh(server: &MockServer, delay: Duration, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({ "refreshToken": "r1" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(tokens("a2", "r2"))
                .set_delay(delay),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_sync_with_expired_token_refreshes_and_completes() {
    let ctx = TestContext::signed_in("a1").await;
    reject_stale_token(&ctx.server).await;
    serve_refresh(&ctx.server, Duration::ZERO, 1).await;
    ctx.mount_group("g1", json!([group("g1", "Home")])).await;

    ctx.store.load_all().await.unwrap();

    let state = ctx.store.snapshot();
    assert!(state.items.is_loaded());
    assert!(state.error.is_none());

    let session = ctx.session.load().unwrap();
    assert_eq!(
        session.refresh_token.map(|t| t.expose_secret().to_owned()),
        Some("r2".to_owned())
    );
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let ctx = TestContext::signed_in("a1").await;
    reject_stale_token(&ctx.server).await;
    serve_refresh(&ctx.server, Duration::from_millis(200), 1).await;
    ctx.mount_group_lists("g1").await;
    let group_id = GroupId::new("g1");

    let (items, shopping, wishes) = tokio::join!(
        ctx.api.list_items(&group_id),
        ctx.api.list_shopping(&group_id),
        ctx.api.list_wishes(&group_id),
    );

    assert_eq!(items.unwrap().len(), 1);
    assert_eq!(shopping.unwrap().len(), 1);
    assert_eq!(wishes.unwrap().len(), 1);
    assert!(ctx.session.is_authenticated());
}

#[tokio::test]
async fn test_fail_fast_rejects_callers_during_refresh() {
    let ctx = TestContext::with_policy(RefreshPolicy::FailFast).await;
    ctx.sign_in("a1");
    reject_stale_token(&ctx.server).await;
    serve_refresh(&ctx.server, Duration::from_millis(300), 1).await;
    ctx.mount_group_lists("g1").await;
    let group_id = GroupId::new("g1");

    let (items, shopping) = tokio::join!(
        ctx.api.list_items(&group_id),
        ctx.api.list_shopping(&group_id),
    );

    let outcomes = [items.is_ok(), shopping.is_ok()];
    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
    assert!(
        [items.err(), shopping.err()]
            .into_iter()
            .flatten()
            .all(|e| matches!(e, ApiError::Unauthorized))
    );
    assert!(ctx.session.is_authenticated());
}

#[tokio::test]
async fn test_rejected_refresh_signs_out() {
    let ctx = TestContext::signed_in("a1").await;
    reject_stale_token(&ctx.server).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let err = ctx.store.load_all().await.unwrap_err();

    assert!(matches!(err, StoreError::Api(ApiError::Unauthorized)));
    assert!(!ctx.session.is_authenticated());
    assert!(ctx.session.load().unwrap().refresh_token.is_none());
}

#[tokio::test]
async fn test_still_unauthorized_after_refresh_signs_out() {
    let ctx = TestContext::signed_in("a1").await;
    Mock::given(method("GET"))
        .and(path("/groups"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&ctx.server)
        .await;
    serve_refresh(&ctx.server, Duration::ZERO, 1).await;

    let err = ctx.store.load_all().await.unwrap_err();

    assert!(matches!(err, StoreError::Api(ApiError::Unauthorized)));
    assert!(!ctx.session.is_authenticated());
}

#[tokio::test]
async fn test_login_then_sync_uses_issued_token() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens("a2", "r2")))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/groups"))
        .and(header("authorization", "Bearer a2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "groups": [] })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let request = LoginRequest::new("sam@example.com", "correct horse").unwrap();
    ctx.api.login(request).await.unwrap();
    ctx.store.load_all().await.unwrap();

    assert!(ctx.session.is_authenticated());
    assert!(ctx.session.load().unwrap().device_id.is_some());
}

#[tokio::test]
async fn test_wrong_password_is_a_server_error() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid credentials" })),
        )
        .mount(&ctx.server)
        .await;

    let request = LoginRequest::new("sam@example.com", "wrong password").unwrap();
    let err = ctx.api.login(request).await.unwrap_err();

    assert_eq!(err.to_string(), "Server error 401: Invalid credentials");
    assert!(!ctx.session.is_authenticated());
}
