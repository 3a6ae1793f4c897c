// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth hand-off through the backend.
//!
//! Handles:
//! - Starting the flow (with an https upgrade in production)
//! - Completing the provider return (query error or fragment tokens)
//! - Linking a first-time Google sign-in with a backend account

use chrono::Utc;
use std::sync::Arc;
use url::{Position, Url};

use crate::config::{ConfigError, OAuthSettings};
use crate::error::{ApiError, ApiErrorKind, AuthErrorCode};
use crate::middleware::auth::token_used_too_early;
use crate::models::{CredentialPair, GoogleUser, SyncResponse, SyncedUser};
use crate::services::api_client::ApiClient;
use crate::services::browser::Navigator;
use crate::services::token_store::TokenStore;

/// Where to send the browser to start sign-in from `current`.
///
/// In production an insecure page is first upgraded to https on the same
/// host and path.
pub fn begin_target(settings: &OAuthSettings, current: &Url) -> Result<String, ConfigError> {
    if settings.production && current.scheme() != "https" {
        return Ok(format!(
            "https://{}",
            &current[Position::BeforeHost..Position::AfterPath]
        ));
    }

    let backend_url = settings
        .backend_url
        .as_deref()
        .ok_or(ConfigError::Missing("BACKEND_URL"))?;

    Ok(format!(
        "{}/api/auth/google",
        backend_url.trim_end_matches('/')
    ))
}

/// Starts the provider sign-in with a full-page navigation.
#[derive(Clone)]
pub struct OAuthInitiator {
    settings: OAuthSettings,
    navigator: Arc<dyn Navigator>,
}

impl OAuthInitiator {
    pub fn new(settings: OAuthSettings, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            settings,
            navigator,
        }
    }

    /// Navigate to the provider, or fail before navigating if the backend
    /// URL is not configured.
    pub fn begin(&self) -> Result<(), ConfigError> {
        let target = begin_target(&self.settings, &self.navigator.current_url())?;
        tracing::info!(target_url = %target, "Starting Google OAuth flow");
        self.navigator.assign(&target);
        Ok(())
    }
}

/// True when `url` looks like a provider return.
pub fn is_provider_return(url: &Url) -> bool {
    url.query_pairs().any(|(k, _)| k == "code") || url.fragment().is_some_and(|f| !f.is_empty())
}

/// Navigation performed by [`CallbackHandler::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Tokens stored, browser sent to the dashboard.
    SignedIn,
    /// Browser sent to the login page with this code.
    Failed {
        code: String,
        detail: Option<String>,
    },
}

/// Completes the provider return on the current page.
#[derive(Clone)]
pub struct CallbackHandler {
    tokens: TokenStore,
    navigator: Arc<dyn Navigator>,
}

impl CallbackHandler {
    pub fn new(tokens: TokenStore, navigator: Arc<dyn Navigator>) -> Self {
        Self { tokens, navigator }
    }

    /// Handle the provider return once. Every path ends in a navigation.
    pub fn complete(&self) -> CallbackOutcome {
        let url = self.navigator.current_url();

        let error = url
            .query_pairs()
            .find(|(k, _)| k == "error")
            .map(|(_, v)| v.into_owned());

        if let Some(code) = error {
            let detail = url
                .query_pairs()
                .find(|(k, _)| k == "error_detail")
                .map(|(_, v)| v.into_owned());
            tracing::warn!(error = %code, detail = ?detail, "OAuth error from provider");
            return self.fail(code, detail);
        }

        let fragment = url.fragment().unwrap_or_default();
        let mut access_token = None;
        let mut refresh_token = None;
        for (key, value) in url::form_urlencoded::parse(fragment.as_bytes()) {
            match key.as_ref() {
                "access_token" => access_token = Some(value.into_owned()),
                "refresh_token" => refresh_token = Some(value.into_owned()),
                _ => {}
            }
        }

        match (access_token, refresh_token) {
            (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
                if token_used_too_early(&access, Utc::now().timestamp()) {
                    tracing::warn!("Access token issued in the future, local clock looks wrong");
                    return self.fail(AuthErrorCode::ClockSync.as_str().to_string(), None);
                }

                if self
                    .tokens
                    .store(&CredentialPair::new(access, refresh))
                    .is_err()
                {
                    return self.fail(
                        AuthErrorCode::TokenExchangeFailed.as_str().to_string(),
                        None,
                    );
                }
                tracing::info!("OAuth callback handled, tokens stored");
                self.navigator.assign("/dashboard");
                CallbackOutcome::SignedIn
            }
            _ => {
                tracing::warn!("Provider return carried neither an error nor tokens");
                self.fail(AuthErrorCode::AuthFailed.as_str().to_string(), None)
            }
        }
    }

    fn fail(&self, code: String, detail: Option<String>) -> CallbackOutcome {
        let mut target = format!("/login?error={}", urlencoding::encode(&code));
        if let Some(detail) = detail.as_deref().filter(|d| !d.is_empty()) {
            target.push_str("&error_detail=");
            target.push_str(&urlencoding::encode(detail));
        }
        self.navigator.assign(&target);
        CallbackOutcome::Failed { code, detail }
    }
}

/// Links a first-time Google sign-in with a backend account.
#[derive(Clone)]
pub struct AccountLinker {
    client: Arc<ApiClient>,
    tokens: TokenStore,
    navigator: Arc<dyn Navigator>,
}

impl AccountLinker {
    pub fn new(client: Arc<ApiClient>, tokens: TokenStore, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            client,
            tokens,
            navigator,
        }
    }

    /// Sync the provider profile, store the issued tokens and return the
    /// backend user. Failures also send the browser to the login page.
    pub async fn link(&self, user: &GoogleUser) -> Result<SyncedUser, ApiError> {
        let linked = self
            .client
            .post_public::<_, SyncResponse>("/api/auth/sync-google-user", user)
            .await
            .and_then(|response| {
                self.tokens
                    .store(&CredentialPair::new(
                        response.access_token,
                        response.refresh_token,
                    ))
                    .map_err(|e| ApiError::storage(e.to_string()))?;
                Ok(response.user)
            });

        match linked {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Google user linked");
                Ok(user)
            }
            Err(e) => {
                let code = match e.kind {
                    ApiErrorKind::ClockSkew => AuthErrorCode::ClockSync,
                    _ => AuthErrorCode::TokenExchangeFailed,
                };
                tracing::warn!(error = %e, code = code.as_str(), "Google user sync failed");
                self.navigator.assign(&code.login_path());
                Err(e)
            }
        }
    }
}
