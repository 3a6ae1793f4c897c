// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types: edge handler errors with consistent responses, typed backend
//! API errors, and the reason codes shown on the login page.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::config::ConfigError;

/// Edge server error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Config(err) => {
                tracing::error!(error = %err, "Configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error", None)
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

// ─── Backend API errors ──────────────────────────────────────────────────────

/// What went wrong with a backend call, decided where it was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Missing, invalid or expired credentials (after any refresh attempt).
    Unauthorized,
    /// The backend rejected a token as not yet valid: the local clock is off.
    ClockSkew,
    /// No response at all (connect failure, timeout).
    NetworkFailure,
    /// Any other non-success status.
    Http,
    /// A success response whose body could not be parsed.
    Decode,
    /// The client could not be built from its configuration.
    Config,
    /// Issued credentials could not be written to session storage.
    Storage,
}

/// Typed error from the authenticated request client.
#[derive(Debug, Clone, thiserror::Error)]
#[error("API error {status}: {message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// HTTP-like status: the response status, 401 for auth failures and 500
    /// for failures without a response.
    pub status: u16,
    pub message: String,
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            status: 401,
            message: message.into(),
        }
    }

    pub fn clock_skew(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::ClockSkew,
            status: 401,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::NetworkFailure,
            status: 500,
            message: message.into(),
        }
    }

    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            status,
            message: body.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Decode,
            status: 500,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Config,
            status: 500,
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Storage,
            status: 500,
            message: message.into(),
        }
    }

    /// True for failures that mean the stored credentials are unusable.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.kind, ApiErrorKind::Unauthorized | ApiErrorKind::ClockSkew)
    }
}

// ─── Login page reason codes ─────────────────────────────────────────────────

/// Reason codes carried to the login page in the `error` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCode {
    AuthFailed,
    TokenExchangeFailed,
    SessionExpired,
    ClockSync,
}

impl AuthErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthErrorCode::AuthFailed => "auth_failed",
            AuthErrorCode::TokenExchangeFailed => "token_exchange_failed",
            AuthErrorCode::SessionExpired => "session_expired",
            AuthErrorCode::ClockSync => "clock_sync",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "auth_failed" => Some(AuthErrorCode::AuthFailed),
            "token_exchange_failed" => Some(AuthErrorCode::TokenExchangeFailed),
            "session_expired" => Some(AuthErrorCode::SessionExpired),
            "clock_sync" => Some(AuthErrorCode::ClockSync),
            _ => None,
        }
    }

    /// Banner text shown on the login page.
    pub fn message(&self) -> &'static str {
        match self {
            AuthErrorCode::AuthFailed => "Authentication failed. Please try again.",
            AuthErrorCode::TokenExchangeFailed => {
                "Failed to complete authentication. Please try again."
            }
            AuthErrorCode::SessionExpired => "Your session has expired. Please log in again.",
            AuthErrorCode::ClockSync => {
                "There seems to be a time synchronization issue. Please check your computer's clock is set correctly and try again."
            }
        }
    }

    /// Path of the login page carrying this code.
    pub fn login_path(&self) -> String {
        format!("/login?error={}", self.as_str())
    }
}

/// Resolve the login banner from the raw `error` / `error_detail` parameters.
pub fn login_banner(error: Option<&str>, error_detail: Option<&str>) -> Option<String> {
    if error.is_none() && error_detail.is_none() {
        return None;
    }

    let known = error.and_then(AuthErrorCode::parse).map(|c| c.message());
    Some(
        known
            .or(error_detail)
            .unwrap_or("An error occurred. Please try again.")
            .to_string(),
    )
}
