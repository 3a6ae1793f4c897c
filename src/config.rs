// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! The edge server reads this once at startup. The browser-side auth core
//! never reads the environment itself; it receives the derived
//! [`ClientConfig`] and [`OAuthSettings`] objects instead.

use std::env;
use std::time::Duration;

/// Default request timeout for backend calls.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default "who am I" endpoint.
pub const DEFAULT_IDENTITY_ENDPOINT: &str = "/api/auth/me";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend API base URL (e.g. `https://api.financial-amigo.app`).
    /// Optional at load time; operations that need it fail with
    /// [`ConfigError::Missing`].
    pub backend_url: Option<String>,
    /// Production build flag (enables the https upgrade and HSTS).
    pub production: bool,
    /// Server port
    pub port: u16,
    /// HS256 key used to verify access tokens at the edge
    pub jwt_secret_key: Vec<u8>,
    /// Fixed timeout applied to every backend request
    pub request_timeout: Duration,
    /// Endpoint used by the session context to fetch the identity
    pub identity_endpoint: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            backend_url: Some("http://localhost:8000".to_string()),
            production: false,
            port: 3000,
            jwt_secret_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            identity_endpoint: DEFAULT_IDENTITY_ENDPOINT.to_string(),
        }
    }
}

/// Connection settings for the authenticated request client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

/// Settings consumed by the OAuth initiator.
#[derive(Debug, Clone, Default)]
pub struct OAuthSettings {
    pub backend_url: Option<String>,
    pub production: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honoured for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let request_timeout = match env::var("REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| ConfigError::Invalid("REQUEST_TIMEOUT_SECS", e.to_string()))?,
            Err(_) => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        Ok(Self {
            backend_url: env::var("BACKEND_URL")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            production: env::var("APP_ENV")
                .map(|v| v.eq_ignore_ascii_case("production"))
                .unwrap_or(false),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            jwt_secret_key: env::var("JWT_SECRET_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SECRET_KEY"))?
                .into_bytes(),
            request_timeout,
            identity_endpoint: env::var("IDENTITY_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_IDENTITY_ENDPOINT.to_string()),
        })
    }

    /// Build the request client configuration.
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        let base_url = self
            .backend_url
            .clone()
            .ok_or(ConfigError::Missing("BACKEND_URL"))?;

        Ok(ClientConfig {
            base_url,
            timeout: self.request_timeout,
        })
    }

    /// Build the OAuth initiator settings.
    pub fn oauth_settings(&self) -> OAuthSettings {
        OAuthSettings {
            backend_url: self.backend_url.clone(),
            production: self.production,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
