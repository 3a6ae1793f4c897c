// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated client for the backend API.
//!
//! Handles:
//! - Bearer credential attachment from the shared default header
//! - A single refresh-and-retry when a call is rejected with 401
//! - Session teardown and the `session_expired` redirect when refresh fails
//! - Mapping transport failures and timeouts to network errors

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::{ApiError, AuthErrorCode};
use crate::models::{CredentialPair, RefreshResponse};
use crate::services::browser::Navigator;
use crate::services::token_store::TokenStore;

/// Backend reason text for a token presented before its issue time.
const TOKEN_USED_TOO_EARLY: &str = "Token used too early";

/// One logical call, alive across its retry.
struct PendingRequest {
    method: Method,
    url: String,
    body: Option<Value>,
    retried: bool,
}

/// Backend API client with token refresh.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenStore,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Create a client. The timeout in `config` applies to every request.
    pub fn new(
        config: ClientConfig,
        tokens: TokenStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
            navigator,
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(Method::GET, endpoint, None).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = to_json(body)?;
        self.request(Method::POST, endpoint, Some(body)).await
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = to_json(body)?;
        self.request(Method::PATCH, endpoint, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(Method::DELETE, endpoint, None).await
    }

    /// Issue an authenticated call.
    ///
    /// At most one refresh-and-retry happens per call: a 401 on the retried
    /// attempt is final.
    #[tracing::instrument(skip_all, fields(method = %method, endpoint = %endpoint))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let mut pending = PendingRequest {
            method,
            url: self.url(endpoint),
            body,
            retried: false,
        };

        loop {
            let Some(pair) = self.tokens.retrieve() else {
                tracing::debug!("No stored credentials, rejecting without a network call");
                return Err(ApiError::unauthorized("Not authenticated"));
            };

            let authorization = self.tokens.authorization(&pair);
            let response = self.send(&pending, Some(&authorization)).await?;
            let status = response.status();

            if status.is_success() {
                return parse_body(response).await;
            }

            if status != StatusCode::UNAUTHORIZED {
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(status = status.as_u16(), "Backend request failed");
                return Err(ApiError::http(status.as_u16(), body));
            }

            if pending.retried || pair.refresh_token.is_empty() {
                return Err(ApiError::unauthorized("Authentication required"));
            }

            pending.retried = true;
            self.refresh_session(&pair.refresh_token).await?;
        }
    }

    /// Unauthenticated POST, outside the refresh machinery.
    pub async fn post_public<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let pending = PendingRequest {
            method: Method::POST,
            url: self.url(endpoint),
            body: Some(to_json(body)?),
            retried: false,
        };

        let response = self.send(&pending, None).await?;
        let status = response.status();
        if status.is_success() {
            return parse_body(response).await;
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            if body.contains(TOKEN_USED_TOO_EARLY) {
                return Err(ApiError::clock_skew(body));
            }
            return Err(ApiError::unauthorized(body));
        }
        Err(ApiError::http(status.as_u16(), body))
    }

    /// Exchange the refresh token and install the new pair, or tear the
    /// session down and send the browser to the login page.
    async fn refresh_session(&self, refresh_token: &str) -> Result<(), ApiError> {
        tracing::info!("Access token rejected, refreshing");

        let refreshed = self
            .exchange_refresh_token(refresh_token)
            .await
            .and_then(|pair| {
                self.tokens
                    .store(&pair)
                    .map_err(|e| ApiError::storage(e.to_string()))
            });

        match refreshed {
            Ok(()) => {
                tracing::info!("Token refreshed");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed, clearing session");
                self.tokens.clear();
                self.navigator
                    .assign(&AuthErrorCode::SessionExpired.login_path());
                Err(ApiError::unauthorized("Session expired"))
            }
        }
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<CredentialPair, ApiError> {
        let response = self
            .http
            .post(self.url("/api/auth/refresh"))
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::http(status.as_u16(), body));
        }

        let refreshed: RefreshResponse = response
            .json()
            .await
            .map_err(|e| ApiError::decode(format!("Failed to parse refresh response: {}", e)))?;

        Ok(refreshed.into_pair(refresh_token))
    }

    async fn send(
        &self,
        pending: &PendingRequest,
        authorization: Option<&str>,
    ) -> Result<reqwest::Response, ApiError> {
        let mut builder = self.http.request(pending.method.clone(), &pending.url);
        if let Some(value) = authorization {
            builder = builder.header(reqwest::header::AUTHORIZATION, value);
        }
        if let Some(body) = &pending.body {
            builder = builder.json(body);
        }

        builder.send().await.map_err(transport_error)
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::decode(format!("Failed to serialize body: {}", e)))
}

fn transport_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        tracing::warn!("Backend request timed out");
        ApiError::network(format!("Request timed out: {}", e))
    } else {
        tracing::warn!(error = %e, "Backend unreachable");
        ApiError::network(format!("Network error: {}", e))
    }
}

/// Parse a success body; 204/205 carry none and deserialize from `null`.
async fn parse_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
        return serde_json::from_value(Value::Null).map_err(|_| {
            ApiError::decode(format!(
                "No content response ({}), but a body was expected",
                status.as_u16()
            ))
        });
    }

    response
        .json()
        .await
        .map_err(|e| ApiError::decode(format!("JSON parse error: {}", e)))
}
