// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-side start of the Google OAuth flow.

use axum::{extract::State, http::HeaderMap, response::Redirect, routing::get, Router};
use std::sync::Arc;
use url::Url;

use crate::error::{AppError, Result};
use crate::services::oauth::begin_target;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/google", get(auth_start))
}

/// Redirect to the backend's Google authorization endpoint.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Redirect> {
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost:3000");

    // Behind a TLS-terminating proxy the original scheme arrives in a header
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("http");

    let current = Url::parse(&format!("{}://{}/auth/google", scheme, host))
        .map_err(|e| AppError::BadRequest(format!("Invalid host: {}", e)))?;

    let target = begin_target(&state.config.oauth_settings(), &current)?;

    tracing::info!(target_url = %target, "Starting OAuth flow, redirecting");

    Ok(Redirect::temporary(&target))
}
