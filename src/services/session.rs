// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session lifecycle: login, registration, logout and token validity.

use crate::db::CredentialStore;
use crate::error::AppError;
use crate::models::{TokenPair, UserProfile};
use crate::services::ApiClient;
use std::sync::Arc;
use tokio::sync::watch;

/// Where the last validity check left the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No check has run yet.
    Unknown,
    /// A check is in flight.
    Checking,
    Authenticated,
    Unauthenticated,
}

/// How the refresh step ended.
enum Refresh {
    Refreshed,
    /// The backend answered but issued no new access token.
    Rejected,
    /// No usable answer from the backend.
    Unreachable,
}

/// High-level session service that owns the credential records.
///
/// This service encapsulates:
/// - Login and registration, storing tokens and the user profile
/// - Logout, clearing both records
/// - The validity check: verify the access token, then fall back to one
///   refresh attempt before giving up
///
/// Clones share the same store and state.
#[derive(Clone)]
pub struct SessionService {
    api: ApiClient,
    store: CredentialStore,
    state: Arc<watch::Sender<SessionState>>,
}

impl SessionService {
    pub fn new(api: ApiClient, store: CredentialStore) -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);
        Self {
            api,
            store,
            state: Arc::new(state),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// State recorded by the most recent check, login or logout.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Watch session state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    fn transition(&self, next: SessionState) -> SessionState {
        let previous = self.state.send_replace(next);
        if previous != next {
            tracing::debug!(from = ?previous, to = ?next, "Session state changed");
        }
        next
    }

    // ─── Validity Check ──────────────────────────────────────────

    /// Whether the stored credentials make an authenticated session.
    pub async fn is_logged_in(&self) -> bool {
        self.check().await == SessionState::Authenticated
    }

    /// Run the validity check and return the terminal state.
    ///
    /// 1. No stored access token: unauthenticated, no network call
    /// 2. Backend verifies the access token: authenticated
    /// 3. Otherwise one refresh attempt; success stores the new access token
    /// 4. Refresh rejected by the backend: the token record is dropped,
    ///    unauthenticated
    /// 5. Backend unreachable during refresh: unauthenticated, tokens kept
    ///
    /// Overlapping checks are not deduplicated. Their store writes converge
    /// on the same refreshed token, so the last writer wins.
    pub async fn check(&self) -> SessionState {
        self.transition(SessionState::Checking);

        let Some(tokens) = self.store.read_tokens() else {
            return self.transition(SessionState::Unauthenticated);
        };
        let Some(access) = tokens.access_token() else {
            return self.transition(SessionState::Unauthenticated);
        };

        if self.verify_access(access).await {
            return self.transition(SessionState::Authenticated);
        }

        match self.refresh_stored(&tokens).await {
            Refresh::Refreshed => self.transition(SessionState::Authenticated),
            Refresh::Unreachable => {
                tracing::warn!("Backend unreachable, keeping stored tokens");
                self.transition(SessionState::Unauthenticated)
            }
            Refresh::Rejected => {
                if let Err(e) = self.store.clear_tokens() {
                    tracing::warn!(error = %e, "Failed to drop invalid tokens");
                }
                tracing::info!("Session expired, login required");
                self.transition(SessionState::Unauthenticated)
            }
        }
    }

    /// Step one: ask the backend about the access token.
    ///
    /// Transport failures count as "not valid" so the refresh step still runs.
    async fn verify_access(&self, access: &str) -> bool {
        match self.api.verify_token(access).await {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!(error = %e, "Token verification failed");
                false
            }
        }
    }

    /// Step two: trade the refresh token for a new access token and store it.
    async fn refresh_stored(&self, tokens: &TokenPair) -> Refresh {
        let Some(refresh) = tokens.refresh_token() else {
            return Refresh::Rejected;
        };

        let refreshed = match self.api.refresh_token(refresh).await {
            Ok(t) if t.access_token().is_some() => t,
            Ok(_) => {
                tracing::warn!("Refresh response carried no access token");
                return Refresh::Rejected;
            }
            Err(e @ AppError::Http(_)) => {
                tracing::warn!(error = %e, "Token refresh did not reach the backend");
                return Refresh::Unreachable;
            }
            Err(e) => {
                tracing::info!(error = %e, "Token refresh rejected");
                return Refresh::Rejected;
            }
        };

        // Merge into the latest stored record rather than our earlier read
        let mut updated = self.store.read_tokens().unwrap_or_else(|| tokens.clone());
        updated.merge(refreshed);

        if let Err(e) = self.store.save_tokens(&updated) {
            tracing::warn!(error = %e, "Failed to persist refreshed token");
        }

        tracing::info!("Access token refreshed");
        Refresh::Refreshed
    }

    // ─── Account Flows ───────────────────────────────────────────

    /// Log in, storing the token pair and then the user's profile.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AppError> {
        let tokens = self.api.login(email, password).await?;
        self.store.save_tokens(&tokens)?;

        let access = tokens.access_token().ok_or(AppError::Unauthorized)?;
        let user = self.api.logged_in_user(access).await?;
        self.store.save_user(&user)?;

        self.transition(SessionState::Authenticated);
        tracing::info!(user_id = user.id, "Logged in");
        Ok(user)
    }

    /// Create an account, store its profile, then log in with it.
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, AppError> {
        validate_registration(full_name, email, password)?;

        let user = self.api.register(full_name.trim(), email.trim(), password).await?;
        self.store.save_user(&user)?;

        let tokens = self.api.login(email.trim(), password).await?;
        self.store.save_tokens(&tokens)?;

        self.transition(SessionState::Authenticated);
        tracing::info!(user_id = user.id, "Registered and logged in");
        Ok(user)
    }

    /// Forget the stored tokens and profile.
    pub fn logout(&self) -> Result<(), AppError> {
        self.store.clear()?;
        self.transition(SessionState::Unauthenticated);
        tracing::info!("Logged out");
        Ok(())
    }

    /// Profile saved at the last login, if any.
    pub fn current_user(&self) -> Option<UserProfile> {
        self.store.read_user()
    }

    /// Stored access token for authenticated calls.
    pub fn access_token(&self) -> Result<String, AppError> {
        self.store
            .read_tokens()
            .and_then(|t| t.access_token().map(str::to_string))
            .ok_or(AppError::Unauthorized)
    }

    /// Ask the backend who the stored access token belongs to.
    pub async fn fetch_current_user(&self) -> Result<UserProfile, AppError> {
        let access = self.access_token()?;
        self.api.logged_in_user(&access).await
    }
}

/// Reject registration input the backend would refuse anyway.
fn validate_registration(full_name: &str, email: &str, password: &str) -> Result<(), AppError> {
    if full_name.trim().is_empty() {
        return Err(AppError::BadRequest("Full name is required".to_string()));
    }

    let email = email.trim();
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !well_formed {
        return Err(AppError::BadRequest(format!("Invalid email address: {}", email)));
    }

    if password.is_empty() {
        return Err(AppError::BadRequest("Password is required".to_string()));
    }

    Ok(())
}
