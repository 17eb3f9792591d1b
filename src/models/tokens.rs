// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access/refresh token pair as issued by the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Token record stored under `tokens`.
///
/// Either token may be missing from a stored record. Fields the backend
/// sends beyond `access` and `refresh` are carried along untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Claims we read from an access token for display.
#[derive(Deserialize)]
struct ExpiryClaims {
    exp: i64,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: Some(access.into()),
            refresh: Some(refresh.into()),
            extra: Map::new(),
        }
    }

    /// Access token, treating an empty string as absent.
    pub fn access_token(&self) -> Option<&str> {
        self.access.as_deref().filter(|t| !t.is_empty())
    }

    /// Refresh token, treating an empty string as absent.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh.as_deref().filter(|t| !t.is_empty())
    }

    /// Overlay the fields of a refresh response onto this pair.
    ///
    /// Fields absent from `update` keep their current values, so the refresh
    /// token survives unless the backend rotates it.
    pub fn merge(&mut self, update: TokenPair) {
        if update.access.is_some() {
            self.access = update.access;
        }
        if update.refresh.is_some() {
            self.refresh = update.refresh;
        }
        self.extra.extend(update.extra);
    }

    /// Expiry of the access token, read from its `exp` claim.
    ///
    /// The signature is not checked. This is for display only; validity is
    /// decided by the backend's verify endpoint.
    pub fn access_expires_at(&self) -> Option<DateTime<Utc>> {
        use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

        let token = self.access_token()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
        DateTime::from_timestamp(data.claims.exp, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extra_fields_survive_roundtrip() {
        let raw = json!({"access": "a1", "refresh": "r1", "token_type": "Bearer"});
        let pair: TokenPair = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(pair.access_token(), Some("a1"));
        assert_eq!(pair.extra.get("token_type"), Some(&json!("Bearer")));
        assert_eq!(serde_json::to_value(&pair).unwrap(), raw);
    }

    #[test]
    fn test_merge_keeps_refresh_unless_replaced() {
        let mut pair = TokenPair::new("old_access", "old_refresh");
        pair.merge(serde_json::from_value(json!({"access": "new_access"})).unwrap());
        assert_eq!(pair.access_token(), Some("new_access"));
        assert_eq!(pair.refresh_token(), Some("old_refresh"));

        pair.merge(TokenPair::new("newer_access", "rotated_refresh"));
        assert_eq!(pair.refresh_token(), Some("rotated_refresh"));
    }

    #[test]
    fn test_empty_access_is_absent() {
        let pair: TokenPair = serde_json::from_value(json!({"access": "", "refresh": "r"})).unwrap();
        assert_eq!(pair.access_token(), None);
        assert_eq!(pair.refresh_token(), Some("r"));
    }

    #[test]
    fn test_access_expiry_from_claims() {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let token = encode(
            &Header::default(),
            &json!({"exp": 1_900_000_000, "user_id": 3}),
            &EncodingKey::from_secret(b"backend-secret"),
        )
        .unwrap();

        let pair = TokenPair::new(token, "r");
        assert_eq!(
            pair.access_expires_at(),
            DateTime::from_timestamp(1_900_000_000, 0)
        );

        assert_eq!(TokenPair::new("not-a-jwt", "r").access_expires_at(), None);
    }
}
