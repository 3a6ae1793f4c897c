// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use amigo_session::config::Config;
use amigo_session::middleware::auth::AccessClaims;
use amigo_session::models::CredentialPair;
use amigo_session::routes::create_router;
use amigo_session::services::{MemoryNavigator, MemoryStorage};
use amigo_session::{AppState, AuthProvider};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::sync::Arc;
use std::time::Duration;

/// A fake browser tab: storage, navigator and the provider wired over them.
#[allow(dead_code)]
pub struct TestTab {
    pub storage: Arc<MemoryStorage>,
    pub navigator: Arc<MemoryNavigator>,
    pub auth: AuthProvider,
}

/// Open a tab at `url` talking to the backend at `backend_url`.
#[allow(dead_code)]
pub fn open_tab(backend_url: &str, url: &str) -> TestTab {
    open_tab_with_storage(backend_url, url, Arc::new(MemoryStorage::new()))
}

#[allow(dead_code)]
pub fn open_tab_with_storage(backend_url: &str, url: &str, storage: Arc<MemoryStorage>) -> TestTab {
    let config = Config {
        backend_url: Some(backend_url.to_string()),
        request_timeout: Duration::from_secs(2),
        ..Default::default()
    };
    let navigator = Arc::new(MemoryNavigator::new(url).expect("valid start url"));
    let auth = AuthProvider::new(&config, storage.clone(), navigator.clone())
        .expect("provider should build");

    TestTab {
        storage,
        navigator,
        auth,
    }
}

/// Seed the tab with a credential pair.
#[allow(dead_code)]
pub fn sign_in(tab: &TestTab, access: &str, refresh: &str) {
    tab.auth
        .tokens
        .store(&CredentialPair::new(access, refresh))
        .expect("test storage accepts the pair");
}

/// Sample identity body as returned by the backend.
#[allow(dead_code)]
pub fn identity_json(id: &str, email: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "email": email,
        "name": "Test User",
        "image": null,
        "default_currency": "CAD"
    })
}

/// Create a test app with the default test config.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: Config::default(),
    });

    (create_router(state.clone()), state)
}

/// Create a backend-format access JWT.
#[allow(dead_code)]
pub fn create_test_jwt(email: &str, token_type: &str, exp_offset_secs: i64, signing_key: &[u8]) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = AccessClaims {
        email: email.to_string(),
        exp: (now + exp_offset_secs) as usize,
        token_type: token_type.to_string(),
        iat: Some(now),
        nbf: None,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .unwrap()
}
