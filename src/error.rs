// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types.

/// Error type shared by the store, the API client and the session services.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Login or registration was rejected by the backend.
    #[error("{0}")]
    AuthFailure(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Backend returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Credential storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether this error means the stored credentials are missing or rejected.
    ///
    /// Callers use this to send the user back to the login flow instead of
    /// reporting a generic failure.
    pub fn is_token_error(&self) -> bool {
        matches!(self, AppError::Unauthorized | AppError::InvalidToken)
    }

    /// HTTP status reported by the backend, if the failure came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Api { status, .. } => Some(*status),
            AppError::InvalidToken => Some(401),
            _ => None,
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, AppError>;
