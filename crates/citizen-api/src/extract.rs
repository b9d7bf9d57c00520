//! Request extractors for the caller's session

use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;
use tower_cookies::Cookies;

use citizen_core::domain::User;
use citizen_core::ports::BackendClient;

use crate::error::ApiError;
use crate::middleware::session::resolve_session;
use crate::state::AppState;

/// Outcome of session resolution for one request.
///
/// The session gate inserts it. When the gate was bypassed the extractor
/// resolves the cookies itself, so handlers behave the same either way.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub user: Option<User>,
    /// Token data calls act with; `None` means the anon key.
    pub access_token: Option<String>,
    pub degraded: bool,
}

impl SessionContext {
    pub fn require_user(&self) -> Result<&User, ApiError> {
        self.user
            .as_ref()
            .ok_or_else(|| ApiError::Unauthorized("Sign in required".to_string()))
    }

    pub fn client(&self, state: &AppState) -> Arc<dyn BackendClient> {
        state.backend.client_for(self.access_token.clone())
    }
}

/// Authenticated user, inserted by the session gate.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for SessionContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(context) = parts.extensions.get::<SessionContext>() {
            return Ok(context.clone());
        }

        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| ApiError::InternalError(msg.to_string()))?;
        let context = resolve_session(state, &cookies).await;
        parts.extensions.insert(context.clone());
        Ok(context)
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }
        let context = SessionContext::from_request_parts(parts, state).await?;
        context.require_user().cloned().map(CurrentUser)
    }
}
