// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use capstone_assistant::db::{CredentialStore, KeyValueStore, MemoryStore};
use capstone_assistant::models::TokenPair;
use capstone_assistant::services::{ApiClient, SessionService};
use std::sync::Arc;
use std::time::Duration;
use wiremock::MockServer;

/// Session wired to a mock backend and an in-memory store.
pub struct TestSession {
    pub session: SessionService,
    pub store: CredentialStore,
    pub memory: MemoryStore,
}

/// Create a session talking to `server`.
#[allow(dead_code)]
pub fn test_session(server: &MockServer) -> TestSession {
    let api = ApiClient::new(&server.uri(), Duration::from_secs(5)).expect("client should build");
    let memory = MemoryStore::new();
    let store = CredentialStore::new(Arc::new(memory.clone()));
    let session = SessionService::new(api, store.clone());

    TestSession {
        session,
        store,
        memory,
    }
}

/// Create a session with a stored token pair.
#[allow(dead_code)]
pub fn logged_in_session(server: &MockServer) -> TestSession {
    let t = test_session(server);
    t.store
        .save_tokens(&TokenPair::new("access-1", "refresh-1"))
        .expect("seed tokens");
    t
}

/// Put raw text under a record name, bypassing serialization.
#[allow(dead_code)]
pub fn seed_raw(memory: &MemoryStore, key: &str, value: &str) {
    memory.set(key, value).expect("seed raw record");
}

/// Number of requests the mock backend has seen.
#[allow(dead_code)]
pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|r| r.len())
        .unwrap_or_default()
}
