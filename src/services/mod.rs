// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - browser-side auth core.

pub mod api_client;
pub mod browser;
pub mod oauth;
pub mod session;
pub mod token_store;

pub use api_client::ApiClient;
pub use browser::{MemoryNavigator, MemoryStorage, Navigator, SessionStorage, StorageError};
pub use oauth::{AccountLinker, CallbackHandler, CallbackOutcome, OAuthInitiator};
pub use session::{SessionContext, SessionState};
pub use token_store::{DefaultAuthHeader, TokenStore};
