// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login, registration and logout against a mock backend.

use capstone_assistant::db::keys;
use capstone_assistant::error::AppError;
use capstone_assistant::models::UserProfile;
use capstone_assistant::services::SessionState;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{logged_in_session, request_count, test_session};

async fn mock_login_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/jwt/create/"))
        .and(body_json(json!({"email": "ada@example.com", "password": "hunter22"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "access-1",
            "refresh": "refresh-1"
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mock_me(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/auth/users/me/"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "full_name": "Ada Lovelace",
            "email": "ada@example.com"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_stores_tokens_and_profile() {
    let server = MockServer::start().await;
    mock_login_ok(&server).await;
    mock_me(&server).await;

    let t = test_session(&server);
    let user = t.session.login("ada@example.com", "hunter22").await.unwrap();

    assert_eq!(user.id, 7);
    assert_eq!(user.name, "Ada Lovelace");
    assert_eq!(t.session.current_user(), Some(user));
    assert_eq!(t.session.access_token().unwrap(), "access-1");
    assert_eq!(t.session.state(), SessionState::Authenticated);
}

#[tokio::test]
async fn test_rejected_login_is_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/jwt/create/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .mount(&server)
        .await;

    let t = test_session(&server);
    let err = t.session.login("ada@example.com", "wrong").await.unwrap_err();

    assert!(matches!(err, AppError::AuthFailure(_)));
    assert!(!t.memory.contains_key(keys::TOKENS));
    assert!(!t.memory.contains_key(keys::USER));
}

#[tokio::test]
async fn test_register_then_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/users/"))
        .and(body_json(json!({
            "full_name": "Ada Lovelace",
            "email": "ada@example.com",
            "password": "hunter22"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 7,
            "full_name": "Ada Lovelace",
            "email": "ada@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;
    mock_login_ok(&server).await;

    let t = test_session(&server);
    let user = t
        .session
        .register("Ada Lovelace", "ada@example.com", "hunter22")
        .await
        .unwrap();

    assert_eq!(user.email, "ada@example.com");
    assert!(t.memory.contains_key(keys::USER));
    assert_eq!(t.session.access_token().unwrap(), "access-1");
}

#[tokio::test]
async fn test_register_rejects_bad_input_without_network() {
    let server = MockServer::start().await;
    let t = test_session(&server);

    let err = t
        .session
        .register("Ada", "not-an-email", "hunter22")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_duplicate_registration_is_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/users/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "email": ["user with this email already exists."]
        })))
        .mount(&server)
        .await;

    let t = test_session(&server);
    let err = t
        .session
        .register("Ada Lovelace", "ada@example.com", "hunter22")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::AuthFailure(_)));
    assert!(!t.memory.contains_key(keys::USER));
}

#[tokio::test]
async fn test_logout_clears_both_records() {
    let server = MockServer::start().await;
    let t = logged_in_session(&server);
    t.store
        .save_user(&UserProfile {
            id: 7,
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
        })
        .unwrap();

    t.session.logout().unwrap();

    assert!(!t.memory.contains_key(keys::TOKENS));
    assert!(!t.memory.contains_key(keys::USER));
    assert_eq!(t.session.state(), SessionState::Unauthenticated);
    assert!(matches!(
        t.session.access_token(),
        Err(AppError::Unauthorized)
    ));
}
