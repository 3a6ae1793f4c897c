// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route guard evaluated before a page is served.

use crate::error::AuthErrorCode;
use crate::middleware::auth::{verify_access_token, TokenStatus};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Cookie carrying the access token on page navigations.
pub const ACCESS_TOKEN_COOKIE: &str = "fa_access_token";

/// Page prefixes that need a session.
const PROTECTED_PREFIXES: &[&str] = &["/dashboard", "/settings", "/transactions"];

/// How the guard treats a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Verification callbacks and informational pages.
    Open,
    /// Sign-in pages.
    AuthPage,
    Protected,
    /// Not matched by the guard.
    Unguarded,
}

/// Guard verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

pub fn classify(path: &str) -> RouteClass {
    if path == "/verify-request" || path.starts_with("/api/auth/callback/") {
        return RouteClass::Open;
    }
    if path == "/login" || path == "/register" {
        return RouteClass::AuthPage;
    }
    let protected = PROTECTED_PREFIXES.iter().any(|prefix| {
        path == *prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    });
    if protected {
        RouteClass::Protected
    } else {
        RouteClass::Unguarded
    }
}

/// Decide a navigation to `path` (with optional raw `query`).
pub fn evaluate(path: &str, query: Option<&str>, token: TokenStatus) -> GuardDecision {
    match classify(path) {
        RouteClass::Open | RouteClass::Unguarded => GuardDecision::Allow,
        RouteClass::AuthPage => {
            if token == TokenStatus::Valid {
                GuardDecision::Redirect("/dashboard".to_string())
            } else {
                GuardDecision::Allow
            }
        }
        RouteClass::Protected => {
            if token == TokenStatus::Valid {
                return GuardDecision::Allow;
            }

            let mut from = path.to_string();
            if let Some(q) = query.filter(|q| !q.is_empty()) {
                from.push('?');
                from.push_str(q);
            }
            let callback = urlencoding::encode(&from);

            let target = if token == TokenStatus::ClockSkew {
                format!(
                    "/login?error={}&callbackUrl={}",
                    AuthErrorCode::ClockSync.as_str(),
                    callback
                )
            } else {
                format!("/login?callbackUrl={}", callback)
            };
            GuardDecision::Redirect(target)
        }
    }
}

/// Middleware gating page navigation on a valid access token.
pub async fn route_guard(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) {
        Some(cookie.value().to_string())
    } else {
        request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_string)
    };

    let status = match token.as_deref() {
        Some(t) if !t.is_empty() => verify_access_token(t, &state.config.jwt_secret_key),
        _ => TokenStatus::Missing,
    };

    let path = request.uri().path().to_string();
    match evaluate(&path, request.uri().query(), status) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Redirect(target) => {
            tracing::debug!(
                path = %path,
                token = ?status,
                redirect = %target,
                "Route guard redirect"
            );
            Redirect::temporary(&target).into_response()
        }
    }
}
