//! Credential pair issued by the backend.

use serde::{Deserialize, Serialize};

fn bearer() -> String {
    "bearer".to_string()
}

/// Access + refresh token pair, owned by the token store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    /// Short-lived bearer credential
    pub access_token: String,
    /// Longer-lived credential exchanged for a new access token
    pub refresh_token: String,
    /// Always "bearer"
    #[serde(default = "bearer")]
    pub token_type: String,
}

impl CredentialPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            token_type: bearer(),
        }
    }

    /// A pair with either token empty counts as absent.
    pub fn is_complete(&self) -> bool {
        !self.access_token.is_empty() && !self.refresh_token.is_empty()
    }
}

/// Response from `POST /api/auth/refresh`.
///
/// Some backend versions return only the new access token.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl RefreshResponse {
    /// Merge into a new pair, keeping `previous_refresh` when none was issued.
    pub fn into_pair(self, previous_refresh: &str) -> CredentialPair {
        CredentialPair {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| previous_refresh.to_string()),
            token_type: self.token_type.unwrap_or_else(bearer),
        }
    }
}
