// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session context tests.
//!
//! These tests verify that:
//! 1. Identity is derived from the "who am I" endpoint on navigation
//! 2. Failures clear credentials and send protected pages to login
//! 3. Overlapping verifications publish only the latest result

use amigo_session::error::ApiError;
use amigo_session::models::Currency;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

#[tokio::test]
async fn test_initial_state_is_loading() {
    let tab = common::open_tab("http://localhost:8000", "http://localhost:3000/");

    let state = tab.auth.session.state();
    assert!(state.is_loading);
    assert!(state.identity.is_none());
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_no_tokens_on_protected_page_redirects_to_login() {
    let mock_server = MockServer::start().await;
    let tab = common::open_tab(&mock_server.uri(), "http://localhost:3000/dashboard");

    let state = tab.auth.session.verify("/dashboard").await;

    assert!(!state.is_loading);
    assert!(state.identity.is_none());
    assert_eq!(tab.navigator.last_assigned().as_deref(), Some("/login"));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_no_tokens_on_public_page_stays() {
    let tab = common::open_tab("http://localhost:8000", "http://localhost:3000/");

    let state = tab.auth.session.verify("/").await;

    assert!(!state.is_loading);
    assert!(state.identity.is_none());
    assert!(tab.navigator.history().is_empty());
}

#[tokio::test]
async fn test_valid_session_publishes_identity() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer access"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::identity_json("u1", "user@example.com")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let tab = common::open_tab(&mock_server.uri(), "http://localhost:3000/dashboard");
    common::sign_in(&tab, "access", "refresh");

    let state = tab.auth.session.verify("/dashboard").await;

    let identity = state.identity.expect("identity should be published");
    assert_eq!(identity.id, "u1");
    assert_eq!(identity.default_currency, Currency::Cad);
    assert!(!state.is_loading);
    assert!(state.error.is_none());
    assert!(tab.navigator.history().is_empty());
}

#[tokio::test]
async fn test_failed_verification_clears_tokens() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let tab = common::open_tab(&mock_server.uri(), "http://localhost:3000/settings");
    common::sign_in(&tab, "access", "refresh");

    let state = tab.auth.session.verify("/settings").await;

    assert!(state.identity.is_none());
    assert_eq!(state.error.as_deref(), Some("Authentication failed"));
    assert!(tab.auth.tokens.retrieve().is_none());
    assert_eq!(tab.navigator.last_assigned().as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_failed_verification_on_public_page_does_not_navigate() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let tab = common::open_tab(&mock_server.uri(), "http://localhost:3000/");
    common::sign_in(&tab, "access", "refresh");

    let state = tab.auth.session.verify("/").await;

    assert!(state.identity.is_none());
    assert!(tab.auth.tokens.retrieve().is_none());
    assert!(tab.navigator.history().is_empty());
}

#[tokio::test]
async fn test_expired_session_keeps_the_reason_redirect() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let tab = common::open_tab(&mock_server.uri(), "http://localhost:3000/dashboard");
    common::sign_in(&tab, "old", "revoked");

    tab.auth.session.verify("/dashboard").await;

    assert_eq!(
        tab.navigator.history(),
        vec!["/login?error=session_expired".to_string()]
    );
}

#[tokio::test]
async fn test_stale_verification_is_discarded() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer A"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::identity_json("user-a", "a@example.com"))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer B"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::identity_json("user-b", "b@example.com")),
        )
        .mount(&mock_server)
        .await;

    let tab = common::open_tab(&mock_server.uri(), "http://localhost:3000/dashboard");
    common::sign_in(&tab, "A", "refresh");

    let session = &tab.auth.session;
    let (first, second) = tokio::join!(session.verify("/dashboard"), async {
        common::sign_in(&tab, "B", "refresh");
        session.verify("/settings").await
    });

    assert_eq!(second.identity.as_ref().map(|i| i.id.as_str()), Some("user-b"));
    // The slower, older verification reports the newer result
    assert_eq!(first.identity.as_ref().map(|i| i.id.as_str()), Some("user-b"));
    assert_eq!(
        session.state().identity.map(|i| i.id),
        Some("user-b".to_string())
    );
}

#[tokio::test]
async fn test_handle_error_clears_on_auth_failure() {
    let tab = common::open_tab("http://localhost:8000", "http://localhost:3000/dashboard");
    common::sign_in(&tab, "access", "refresh");

    tab.auth
        .session
        .handle_error(&ApiError::unauthorized("Not authenticated"));

    assert!(tab.auth.tokens.retrieve().is_none());
    let state = tab.auth.session.state();
    assert!(state.identity.is_none());
    assert_eq!(state.error.as_deref(), Some("Not authenticated"));
}

#[tokio::test]
async fn test_handle_error_ignores_other_failures() {
    let tab = common::open_tab("http://localhost:8000", "http://localhost:3000/dashboard");
    common::sign_in(&tab, "access", "refresh");

    tab.auth.session.handle_error(&ApiError::network("offline"));
    tab.auth.session.handle_error(&ApiError::http(403, "forbidden"));

    assert!(tab.auth.tokens.retrieve().is_some());
}

#[tokio::test]
async fn test_subscribers_see_published_state() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::identity_json("u1", "user@example.com")),
        )
        .mount(&mock_server)
        .await;

    let tab = common::open_tab(&mock_server.uri(), "http://localhost:3000/dashboard");
    common::sign_in(&tab, "access", "refresh");

    let mut rx = tab.auth.session.subscribe();
    assert!(rx.borrow_and_update().is_loading);

    tab.auth.session.verify("/dashboard").await;

    assert!(rx.has_changed().unwrap());
    let state = rx.borrow_and_update().clone();
    assert_eq!(state.identity.map(|i| i.email), Some("user@example.com".to_string()));
}
