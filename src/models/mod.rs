// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod credentials;
pub mod identity;

pub use credentials::{CredentialPair, RefreshResponse};
pub use identity::{Currency, GoogleUser, Identity, SyncResponse, SyncedUser};
