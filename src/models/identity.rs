//! User identity as known to the backend.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Supported display currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Currency {
    #[serde(rename = "CAD")]
    Cad,
    #[serde(rename = "USD")]
    Usd,
}

/// Authenticated user's profile, fetched from the "who am I" endpoint.
///
/// Never persisted client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub default_currency: Currency,
}

/// Provider profile sent when linking a first-time Google sign-in.
#[derive(Debug, Clone, Serialize)]
pub struct GoogleUser {
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    pub google_id: String,
}

/// Response from `POST /api/auth/sync-google-user`.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: SyncedUser,
}

/// User record returned by the linking call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SyncedUser {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}
