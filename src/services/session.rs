// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tab-lifetime session state derived from the "who am I" endpoint.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::ApiError;
use crate::models::Identity;
use crate::services::api_client::ApiClient;
use crate::services::browser::Navigator;
use crate::services::token_store::TokenStore;

/// Routes reachable without a session.
pub const PUBLIC_PATHS: &[&str] = &["/login", "/"];

/// Identity state exposed to the UI tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub identity: Option<Identity>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    fn loading() -> Self {
        Self {
            identity: None,
            is_loading: true,
            error: None,
        }
    }

    fn signed_out(error: Option<String>) -> Self {
        Self {
            identity: None,
            is_loading: false,
            error,
        }
    }
}

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

/// Owns the published session state.
///
/// Verifications may overlap on rapid navigation. Each one takes a
/// generation number when it starts, and only the most recently started
/// verification may publish its result.
pub struct SessionContext {
    client: Arc<ApiClient>,
    tokens: TokenStore,
    navigator: Arc<dyn Navigator>,
    identity_endpoint: String,
    state: watch::Sender<SessionState>,
    generation: AtomicU64,
}

impl SessionContext {
    pub fn new(
        client: Arc<ApiClient>,
        tokens: TokenStore,
        navigator: Arc<dyn Navigator>,
        identity_endpoint: impl Into<String>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::loading());
        Self {
            client,
            tokens,
            navigator,
            identity_endpoint: identity_endpoint.into(),
            state,
            generation: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Re-derive the identity for a navigation to `path`.
    ///
    /// Returns the state current after this verification settles, which is a
    /// newer verification's result if this one was overtaken.
    pub async fn verify(&self, path: &str) -> SessionState {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if self.tokens.retrieve().is_none() {
            self.publish(generation, SessionState::signed_out(None));
            if !is_public_path(path) {
                self.redirect_to_login();
            }
            return self.state();
        }

        let result = self.client.get::<Identity>(&self.identity_endpoint).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "Discarding stale session verification");
            return self.state();
        }

        match result {
            Ok(identity) => {
                tracing::debug!(user_id = %identity.id, "Session verified");
                self.publish(
                    generation,
                    SessionState {
                        identity: Some(identity),
                        is_loading: false,
                        error: None,
                    },
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "Auth verification failed");
                self.tokens.clear();
                self.publish(
                    generation,
                    SessionState::signed_out(Some("Authentication failed".to_string())),
                );
                if !is_public_path(path) {
                    self.redirect_to_login();
                }
            }
        }

        self.state()
    }

    /// Application-level catch-all: a 401-flavoured error anywhere means the
    /// stored credentials are useless.
    pub fn handle_error(&self, err: &ApiError) {
        if !err.is_auth_failure() {
            return;
        }

        tracing::info!(kind = ?err.kind, "Clearing credentials after auth failure");
        self.tokens.clear();
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state
            .send_replace(SessionState::signed_out(Some(err.message.clone())));
    }

    fn publish(&self, generation: u64, next: SessionState) {
        if self.generation.load(Ordering::SeqCst) == generation {
            self.state.send_replace(next);
        }
    }

    fn redirect_to_login(&self) {
        // The request client may already have sent us there with a reason.
        if self.navigator.current_url().path() == "/login" {
            return;
        }
        self.navigator.assign("/login");
    }
}
