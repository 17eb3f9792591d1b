// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Capstone Assistant: session and chat client
//!
//! This crate talks to the capstone-project advisory chatbot backend. It
//! keeps the user's credentials in a local store, decides whether the stored
//! session is still valid, and drives new and continued chat threads.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{CredentialStore, FileStore};
use error::AppError;
use services::{ApiClient, SessionService};
use std::sync::Arc;

/// Shared client state built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub session: SessionService,
}

impl AppState {
    /// Build the client from configuration, backed by the on-disk credential file.
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let api = ApiClient::new(&config.api_url, config.http_timeout())?;
        let store = CredentialStore::new(Arc::new(FileStore::open(&config.credentials_path)));
        let session = SessionService::new(api, store);

        Ok(Self { config, session })
    }
}
