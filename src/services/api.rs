// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Assistant backend API client.
//!
//! Thin typed wrappers over the REST endpoints:
//! - Account registration, login and current-user lookup
//! - Token verification and refresh
//! - Chat listing, fetching, creation and continuation
//!
//! Every call fails on a non-2xx status except `verify_token`, whose answer
//! *is* the status.

use crate::config::normalize_base_url;
use crate::error::AppError;
use crate::models::chat::{ChatDetailResponse, ContinueChatResponse, CreateChatResponse};
use crate::models::{ChatSummary, RawMessage, TokenPair, UserProfile};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::Deserialize;
use std::time::Duration;

/// Endpoint paths relative to the base URL. Trailing slashes matter.
pub mod endpoints {
    pub const REGISTER: &str = "auth/users/";
    pub const LOGIN: &str = "auth/jwt/create/";
    pub const REFRESH_TOKEN: &str = "auth/jwt/refresh/";
    pub const VERIFY_TOKEN: &str = "auth/jwt/verify/";
    pub const LOGGED_IN_USER: &str = "auth/users/me/";
    pub const CHATS: &str = "api/chats/";
}

/// Chat ID returned by the create endpoint together with the first answer.
///
/// `ai_response` is empty when the backend sent no answer text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedChat {
    pub chat_id: u64,
    pub ai_response: String,
}

/// Assistant backend client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: normalize_base_url(base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ─── Accounts ────────────────────────────────────────────────

    /// Register a new account. Returns the created profile.
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, AppError> {
        let body = serde_json::json!({
            "full_name": full_name,
            "email": email,
            "password": password,
        });

        let response = self
            .http
            .post(self.url(endpoints::REGISTER))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Registration rejected");
            return Err(AppError::AuthFailure(
                "Unable to register user, please try again".to_string(),
            ));
        }

        Self::parse_json(response).await
    }

    /// Exchange email and password for a token pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AppError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });

        let response = self
            .http
            .post(self.url(endpoints::LOGIN))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Http(e.to_string()))?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Login rejected");
            return Err(AppError::AuthFailure(
                "Unable to login user, please try again".to_string(),
            ));
        }

        let tokens: TokenPair = Self::parse_json(response).await?;
        if tokens.access_token().is_none() {
            return Err(AppError::AuthFailure(
                "Login response did not include an access token".to_string(),
            ));
        }
        Ok(tokens)
    }

    /// Get the profile of the user owning `access_token`.
    pub async fn logged_in_user(&self, access_token: &str) -> Result<UserProfile, AppError> {
        self.get_json(endpoints::LOGGED_IN_USER, access_token).await
    }

    // ─── Tokens ──────────────────────────────────────────────────

    /// Ask the backend whether `token` is valid.
    ///
    /// Returns `Ok(false)` for any non-2xx answer; only transport failures
    /// are errors.
    pub async fn verify_token(&self, token: &str) -> Result<bool, AppError> {
        let response = self
            .http
            .post(self.url(endpoints::VERIFY_TOKEN))
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await
            .map_err(|e| AppError::Http(format!("Token verify request failed: {}", e)))?;

        Ok(response.status().is_success())
    }

    /// Mint a new access token from a refresh token.
    ///
    /// The response may carry a rotated refresh token and other fields.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let response = self
            .http
            .post(self.url(endpoints::REFRESH_TOKEN))
            .json(&serde_json::json!({ "refresh": refresh_token }))
            .send()
            .await
            .map_err(|e| AppError::Http(format!("Token refresh request failed: {}", e)))?;

        Self::check_response_json(response).await
    }

    // ─── Chats ───────────────────────────────────────────────────

    /// List the user's chats.
    pub async fn chat_history(&self, access_token: &str) -> Result<Vec<ChatSummary>, AppError> {
        self.get_json(endpoints::CHATS, access_token).await
    }

    /// Fetch the raw message log of one chat.
    pub async fn chat_messages(
        &self,
        access_token: &str,
        chat_id: u64,
    ) -> Result<Vec<RawMessage>, AppError> {
        let path = format!("{}{}", endpoints::CHATS, chat_id);
        let detail: ChatDetailResponse = self.get_json(&path, access_token).await?;
        Ok(detail.messages)
    }

    /// Start a chat with its first query. The backend answers in the same call.
    pub async fn create_chat(
        &self,
        access_token: &str,
        query: &str,
    ) -> Result<CreatedChat, AppError> {
        let response = self
            .http
            .post(self.url(endpoints::CHATS))
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "user_query": query }))
            .send()
            .await
            .map_err(|e| AppError::Http(e.to_string()))?;

        let created: CreateChatResponse = Self::check_response_json(response).await?;
        Ok(CreatedChat {
            chat_id: created.chat.id,
            ai_response: created.ai_response.unwrap_or_default(),
        })
    }

    /// Send the next query of an existing chat. Returns the assistant's answer.
    pub async fn continue_chat(
        &self,
        access_token: &str,
        chat_id: u64,
        query: &str,
    ) -> Result<String, AppError> {
        let url = self.url(&format!("{}{}/", endpoints::CHATS, chat_id));

        let response = self
            .http
            .put(&url)
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "user_query": query }))
            .send()
            .await
            .map_err(|e| AppError::Http(e.to_string()))?;

        let answer: ContinueChatResponse = Self::check_response_json(response).await?;
        Ok(answer.ai_response.unwrap_or_default())
    }

    /// Generic authenticated GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        access_token: &str,
    ) -> Result<T, AppError> {
        tracing::debug!(path, "GET");

        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Http(e.to_string()))?;

        Self::check_response_json(response).await
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            // Unauthorized - access token expired or revoked
            if status.as_u16() == 401 {
                return Err(AppError::InvalidToken);
            }

            return Err(AppError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Self::parse_json(response).await
    }

    async fn parse_json<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        response
            .json()
            .await
            .map_err(|e| AppError::Http(format!("JSON parse error: {}", e)))
    }
}
