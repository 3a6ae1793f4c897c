// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Amigo-Session: authentication and session core for the Financial Amigo
//! web frontend.
//!
//! The browser-side half (token store, OAuth hand-off, authenticated request
//! client, session context) is wired together by [`AuthProvider`]. The
//! edge-side half is the route guard served by the binary.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use error::ApiError;
use services::{
    AccountLinker, ApiClient, CallbackHandler, Navigator, OAuthInitiator, SessionContext,
    SessionStorage, TokenStore,
};
use std::sync::Arc;

/// Shared edge server state.
pub struct AppState {
    pub config: Config,
}

/// Browser-side auth core, constructed once at application start and passed
/// to every consumer.
pub struct AuthProvider {
    pub tokens: TokenStore,
    pub client: Arc<ApiClient>,
    pub initiator: OAuthInitiator,
    pub callback: CallbackHandler,
    pub linker: AccountLinker,
    pub session: SessionContext,
}

impl AuthProvider {
    pub fn new(
        config: &Config,
        storage: Arc<dyn SessionStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let client_config = config
            .client_config()
            .map_err(|e| ApiError::config(e.to_string()))?;

        let tokens = TokenStore::new(storage);
        let client = Arc::new(ApiClient::new(
            client_config,
            tokens.clone(),
            navigator.clone(),
        )?);

        Ok(Self {
            initiator: OAuthInitiator::new(config.oauth_settings(), navigator.clone()),
            callback: CallbackHandler::new(tokens.clone(), navigator.clone()),
            linker: AccountLinker::new(client.clone(), tokens.clone(), navigator.clone()),
            session: SessionContext::new(
                client.clone(),
                tokens.clone(),
                navigator,
                config.identity_endpoint.clone(),
            ),
            client,
            tokens,
        })
    }
}
