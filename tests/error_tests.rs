// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use amigo_session::error::{ApiError, ApiErrorKind, AuthErrorCode};

#[test]
fn test_error_kinds_carry_statuses() {
    assert_eq!(ApiError::unauthorized("no session").status, 401);
    assert_eq!(ApiError::clock_skew("early").status, 401);
    assert_eq!(ApiError::network("down").status, 500);
    assert_eq!(ApiError::decode("bad json").status, 500);
    assert_eq!(ApiError::http(404, "missing").status, 404);
    assert_eq!(ApiError::http(404, "missing").kind, ApiErrorKind::Http);
}

#[test]
fn test_error_display_includes_status() {
    let err = ApiError::http(503, "maintenance");
    assert_eq!(err.to_string(), "API error 503: maintenance");
}

#[test]
fn test_login_messages_are_distinct() {
    let messages = [
        AuthErrorCode::AuthFailed.message(),
        AuthErrorCode::TokenExchangeFailed.message(),
        AuthErrorCode::SessionExpired.message(),
        AuthErrorCode::ClockSync.message(),
    ];

    for (i, a) in messages.iter().enumerate() {
        for b in &messages[i + 1..] {
            assert_ne!(a, b);
        }
    }
}
