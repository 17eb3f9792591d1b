//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// Profile of the logged-in user, kept in the `user` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Backend user ID
    pub id: u64,
    /// Display name (`full_name` on the wire)
    #[serde(alias = "full_name")]
    pub name: String,
    /// Email address, also the login name
    pub email: String,
}
