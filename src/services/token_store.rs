// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential pair persistence in tab-scoped session storage.
//!
//! The pair is stored as base64-encoded JSON. The encoding only keeps tokens
//! out of plain sight in devtools; it is not encryption.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::sync::{Arc, PoisonError, RwLock};

use crate::models::CredentialPair;
use crate::services::browser::{SessionStorage, StorageError};

/// Fixed storage key for the encoded pair.
pub const AUTH_STORAGE_KEY: &str = "fa_auth";

/// Default `Authorization` header shared by everything that talks to the
/// backend. Last writer wins.
#[derive(Debug, Clone, Default)]
pub struct DefaultAuthHeader(Arc<RwLock<Option<String>>>);

impl DefaultAuthHeader {
    pub fn set_bearer(&self, access_token: &str) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) =
            Some(format!("Bearer {}", access_token));
    }

    pub fn clear(&self) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn get(&self) -> Option<String> {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Token store over a session storage medium.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn SessionStorage>,
    default_header: DefaultAuthHeader,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            storage,
            default_header: DefaultAuthHeader::default(),
        }
    }

    /// Overwrite the stored pair and install it as the default header.
    ///
    /// A failed write clears storage and the header, so no stale blob or
    /// orphaned header survives.
    pub fn store(&self, pair: &CredentialPair) -> Result<(), StorageError> {
        let result = serde_json::to_string(pair)
            .map_err(|e| StorageError::Unavailable(format!("Failed to serialize tokens: {}", e)))
            .and_then(|json| self.storage.set_item(AUTH_STORAGE_KEY, &BASE64.encode(json)));

        match result {
            Ok(()) => {
                self.default_header.set_bearer(&pair.access_token);
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to store auth tokens");
                self.clear();
                Err(e)
            }
        }
    }

    /// `Authorization` value for an attempt with `pair`.
    ///
    /// The shared default header wins; a pair restored from storage without
    /// one (e.g. after a reload) falls back to its own access token.
    pub fn authorization(&self, pair: &CredentialPair) -> String {
        self.default_header
            .get()
            .unwrap_or_else(|| format!("Bearer {}", pair.access_token))
    }

    /// Decode the stored pair, or `None` when absent or unusable.
    ///
    /// Unusable data is removed on the way out.
    pub fn retrieve(&self) -> Option<CredentialPair> {
        let data = self.storage.get_item(AUTH_STORAGE_KEY)?;

        match decode_pair(&data) {
            Some(pair) if pair.is_complete() => Some(pair),
            Some(_) => {
                tracing::warn!("Stored auth tokens incomplete, clearing");
                self.clear();
                None
            }
            None => {
                tracing::warn!("Stored auth tokens corrupt, clearing");
                self.clear();
                None
            }
        }
    }

    /// Remove the stored pair and the shared default header.
    pub fn clear(&self) {
        self.storage.remove_item(AUTH_STORAGE_KEY);
        self.default_header.clear();
    }

    pub fn default_header(&self) -> &DefaultAuthHeader {
        &self.default_header
    }
}

fn decode_pair(data: &str) -> Option<CredentialPair> {
    let bytes = BASE64.decode(data.trim()).ok()?;
    serde_json::from_slice(&bytes).ok()
}
