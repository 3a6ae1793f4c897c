// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Browser seams: tab-scoped storage and full-page navigation.
//!
//! The auth core talks to the browser only through [`SessionStorage`] and
//! [`Navigator`]. The in-memory implementations back the tests and any
//! non-browser host.

use dashmap::DashMap;
use std::sync::{PoisonError, RwLock};
use url::Url;

/// Errors from session storage writes.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage quota exceeded")]
    QuotaExceeded,

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Tab-scoped key/value storage (the browser's `sessionStorage`).
pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str);
}

/// Current location plus full-page navigation (`window.location`).
pub trait Navigator: Send + Sync {
    fn current_url(&self) -> Url;
    /// Navigate to `target`, absolute or relative to the current URL.
    fn assign(&self, target: &str);
}

/// In-memory session storage with an optional byte quota.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: DashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that rejects writes whose key + value exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            items: DashMap::new(),
            quota: Some(bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).map(|v| v.value().clone())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            if key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        self.items.remove(key);
    }
}

/// Navigator that records every navigation instead of leaving the page.
#[derive(Debug)]
pub struct MemoryNavigator {
    current: RwLock<Url>,
    history: RwLock<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new(start: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            current: RwLock::new(Url::parse(start)?),
            history: RwLock::new(Vec::new()),
        })
    }

    /// Every target passed to [`Navigator::assign`], oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_assigned(&self) -> Option<String> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Navigator for MemoryNavigator {
    fn current_url(&self) -> Url {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn assign(&self, target: &str) {
        tracing::debug!(target_url = %target, "Navigating");

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        match current.join(target) {
            Ok(next) => *current = next,
            Err(e) => tracing::warn!(error = %e, "Navigation target did not resolve"),
        }
        drop(current);

        self.history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(target.to_string());
    }
}
