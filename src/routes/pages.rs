// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Page descriptor routes served behind the route guard.
//!
//! The UI itself is rendered client-side; these handlers only name the page
//! and resolve the login banner.

use axum::{extract::Query, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::login_banner;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login))
        .route("/register", get(login))
        .route("/dashboard", get(|| page("dashboard")))
        .route("/settings", get(|| page("settings")))
        .route("/transactions", get(|| page("transactions")))
        .route("/verify-request", get(|| page("verify-request")))
        .route("/api/auth/callback/email", get(|| page("email-callback")))
}

/// Page descriptor.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PageResponse {
    pub page: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    #[serde(rename = "callbackUrl", skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

async fn page(name: &str) -> Json<PageResponse> {
    Json(PageResponse {
        page: name.to_string(),
        banner: None,
        callback_url: None,
    })
}

#[derive(Deserialize)]
pub struct LoginParams {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_detail: Option<String>,
    #[serde(default, rename = "callbackUrl")]
    callback_url: Option<String>,
}

/// Login page with the banner for any carried reason code.
async fn login(Query(params): Query<LoginParams>) -> Json<PageResponse> {
    Json(PageResponse {
        page: "login".to_string(),
        banner: login_banner(params.error.as_deref(), params.error_detail.as_deref()),
        callback_url: params.callback_url,
    })
}
