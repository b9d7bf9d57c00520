//! Session entity

use serde::{Deserialize, Serialize};

use super::user::User;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds the access token stays valid from issue.
    pub expires_in: i64,
    /// Unix timestamp (seconds).
    #[serde(default)]
    pub expires_at: i64,
    pub user: User,
}

/// Result of sign-up / sign-in. Sign-up can return a user without a session
/// when the backend requires email confirmation first.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthResponse {
    pub user: User,
    pub session: Option<Session>,
}
