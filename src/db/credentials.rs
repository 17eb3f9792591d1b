// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed access to the `tokens` and `user` records.
//!
//! Reads never fail: a missing, unreadable or corrupt record is reported as
//! absent. Token contents are not validated here.

use super::{keys, KeyValueStore};
use crate::error::AppError;
use crate::models::{TokenPair, UserProfile};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Credential records over an injectable key-value store.
#[derive(Clone)]
pub struct CredentialStore {
    inner: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    /// Replace the stored token pair.
    pub fn save_tokens(&self, tokens: &TokenPair) -> Result<(), AppError> {
        self.write(keys::TOKENS, tokens)
    }

    /// Replace the stored user profile.
    pub fn save_user(&self, user: &UserProfile) -> Result<(), AppError> {
        self.write(keys::USER, user)
    }

    pub fn read_tokens(&self) -> Option<TokenPair> {
        self.read(keys::TOKENS)
    }

    pub fn read_user(&self) -> Option<UserProfile> {
        self.read(keys::USER)
    }

    /// Drop only the token record (session invalidated, profile kept).
    pub fn clear_tokens(&self) -> Result<(), AppError> {
        self.inner.remove(keys::TOKENS)
    }

    /// Drop both records (logout).
    pub fn clear(&self) -> Result<(), AppError> {
        self.inner.remove(keys::TOKENS)?;
        self.inner.remove(keys::USER)
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let encoded = serde_json::to_string(value)
            .map_err(|e| AppError::Storage(format!("Failed to encode {}: {}", key, e)))?;
        self.inner.set(key, &encoded)
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.inner.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read credential record");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring malformed credential record");
                None
            }
        }
    }
}
