// ============================================================================
// Citizen Core - Session Resolution
// File: crates/citizen-core/src/services/session_service.rs
// ============================================================================
//! Turns the cookie token pair into an authenticated user, refreshing the
//! session when the access token is stale.
//!
//! Backend outages fail open: the request continues as anonymous and the
//! cookies are left untouched so the next request can try again.

use citizen_security::{jwt, SessionTokens};
use tracing::{debug, error, warn};

use crate::domain::{Session, User};
use crate::error::BackendError;
use crate::ports::BackendClient;

/// Access tokens this close to expiry are refreshed instead of looked up.
pub const DEFAULT_EXPIRY_SKEW_SECS: i64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub enum CookieUpdate {
    Unchanged,
    Replace(Session),
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionResolution {
    pub user: Option<User>,
    pub cookies: CookieUpdate,
    /// The backend could not be asked; `user` is `None` because of that,
    /// not because the visitor is anonymous.
    pub degraded: bool,
}

impl SessionResolution {
    fn anonymous(cookies: CookieUpdate) -> Self {
        Self {
            user: None,
            cookies,
            degraded: false,
        }
    }

    fn unavailable(err: &BackendError, step: &str) -> Self {
        error!("Session {} failed, continuing unauthenticated: {}", step, err);
        Self {
            user: None,
            cookies: CookieUpdate::Unchanged,
            degraded: true,
        }
    }
}

pub struct SessionService {
    expiry_skew_seconds: i64,
}

impl Default for SessionService {
    fn default() -> Self {
        Self::new(DEFAULT_EXPIRY_SKEW_SECS)
    }
}

impl SessionService {
    pub fn new(expiry_skew_seconds: i64) -> Self {
        Self { expiry_skew_seconds }
    }

    pub async fn resolve(
        &self,
        client: &dyn BackendClient,
        tokens: &SessionTokens,
    ) -> SessionResolution {
        if tokens.is_empty() {
            return SessionResolution::anonymous(CookieUpdate::Unchanged);
        }

        if let Some(access_token) = tokens.access_token.as_deref() {
            if jwt::is_expired(access_token, self.expiry_skew_seconds) {
                debug!("Access token expired, refreshing");
            } else {
                match client.get_user(access_token).await {
                    Ok(user) => {
                        return SessionResolution {
                            user: Some(user),
                            cookies: CookieUpdate::Unchanged,
                            degraded: false,
                        };
                    }
                    Err(e) if e.is_auth_rejection() => {
                        debug!("Access token rejected ({}), refreshing", e);
                    }
                    Err(e) => return SessionResolution::unavailable(&e, "lookup"),
                }
            }
        }

        let Some(refresh_token) = tokens.refresh_token.as_deref() else {
            return SessionResolution::anonymous(CookieUpdate::Clear);
        };

        match client.refresh_session(refresh_token).await {
            Ok(session) => {
                debug!("Session refreshed for user {}", session.user.id);
                SessionResolution {
                    user: Some(session.user.clone()),
                    cookies: CookieUpdate::Replace(session),
                    degraded: false,
                }
            }
            Err(e) if e.is_auth_rejection() => {
                warn!("Refresh token rejected, clearing session: {}", e);
                SessionResolution::anonymous(CookieUpdate::Clear)
            }
            Err(e) => SessionResolution::unavailable(&e, "refresh"),
        }
    }
}
