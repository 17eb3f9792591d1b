// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential records persisted through the file store.

use capstone_assistant::db::{CredentialStore, FileStore};
use capstone_assistant::models::{TokenPair, UserProfile};
use std::sync::Arc;

fn file_store(path: &std::path::Path) -> CredentialStore {
    CredentialStore::new(Arc::new(FileStore::open(path)))
}

#[test]
fn test_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");

    let store = file_store(&path);
    store.save_tokens(&TokenPair::new("a", "r")).unwrap();
    store
        .save_user(&UserProfile {
            id: 3,
            name: "Grace Hopper".to_string(),
            email: "grace@example.com".to_string(),
        })
        .unwrap();

    let reopened = file_store(&path);
    assert_eq!(reopened.read_tokens(), Some(TokenPair::new("a", "r")));
    assert_eq!(reopened.read_user().map(|u| u.id), Some(3));

    reopened.clear().unwrap();
    let after_logout = file_store(&path);
    assert_eq!(after_logout.read_tokens(), None);
    assert_eq!(after_logout.read_user(), None);
}

#[test]
fn test_corrupt_credentials_file_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");

    let garbage: [&[u8]; 2] = [b"\0\0garbage", &[0xff, 0xfe, 0x00, 0x7b]];
    for bytes in garbage {
        std::fs::write(&path, bytes).unwrap();

        let store = file_store(&path);
        assert_eq!(store.read_tokens(), None);
        assert_eq!(store.read_user(), None);

        store.clear().unwrap();
        store.save_tokens(&TokenPair::new("fresh", "r")).unwrap();
        assert_eq!(
            store.read_tokens().and_then(|t| t.access),
            Some("fresh".to_string())
        );
    }
}
