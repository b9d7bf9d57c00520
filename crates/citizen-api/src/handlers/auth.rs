// ============================================================================
// Citizen API - Auth Handlers
// File: crates/citizen-api/src/handlers/auth.rs
// ============================================================================
//! Sign-in, sign-up, password reset and sign-out

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
    Json,
};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;

use citizen_core::services::{AuthService, ResetPasswordForm, SignInForm, SignUpForm};
use citizen_security::redirect::safe_next;
use citizen_shared::constants::LOGIN_PATH;

use crate::error::ApiError;
use crate::extract::SessionContext;
use crate::handlers::CreatedResult;
use crate::response::{ApiResponse, UserView};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// What an auth page needs to render its form.
#[derive(Debug, Serialize)]
pub struct AuthPage {
    pub page: &'static str,
    pub next: String,
}

#[derive(Debug, Serialize)]
pub struct SignUpView {
    pub user: UserView,
    /// False while the backend waits for email confirmation.
    pub session_started: bool,
}

/// GET /auth/login
pub async fn login_page(Query(query): Query<NextQuery>) -> Json<AuthPage> {
    Json(AuthPage {
        page: "login",
        next: safe_next(query.next.as_deref()),
    })
}

/// GET /auth/signup
pub async fn signup_page(Query(query): Query<NextQuery>) -> Json<AuthPage> {
    Json(AuthPage {
        page: "signup",
        next: safe_next(query.next.as_deref()),
    })
}

/// GET /auth/reset-password
pub async fn reset_password_page() -> Json<AuthPage> {
    Json(AuthPage {
        page: "reset-password",
        next: LOGIN_PATH.to_string(),
    })
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<NextQuery>,
    Json(form): Json<SignInForm>,
) -> Result<Redirect, ApiError> {
    let client = state.backend.client();
    let response = AuthService::sign_in(client.as_ref(), &form).await?;
    let session = response
        .session
        .ok_or_else(|| ApiError::Unauthorized("Email address not confirmed".to_string()))?;

    state
        .cookie_jar(cookies)
        .store(&session.access_token, &session.refresh_token, session.expires_in);
    Ok(Redirect::to(&safe_next(query.next.as_deref())))
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(form): Json<SignUpForm>,
) -> CreatedResult<SignUpView> {
    let client = state.backend.client();
    let response =
        AuthService::sign_up(client.as_ref(), &form, state.site_link(LOGIN_PATH)).await?;

    let session_started = match &response.session {
        Some(session) => {
            state
                .cookie_jar(cookies)
                .store(&session.access_token, &session.refresh_token, session.expires_in);
            true
        }
        None => false,
    };
    let message = if session_started {
        "Account created"
    } else {
        "Account created. Check your email to confirm it."
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            SignUpView {
                user: UserView::from(&response.user),
                session_started,
            },
            message,
        )),
    ))
}

/// POST /auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(form): Json<ResetPasswordForm>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let client = state.backend.client();
    AuthService::reset_password(client.as_ref(), &form, state.site_link("/auth/reset-password"))
        .await?;
    Ok(Json(ApiResponse::with_message(
        (),
        "If an account exists for that address, a reset link is on its way.",
    )))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
    session: SessionContext,
) -> Redirect {
    AuthService::sign_out(session.client(&state).as_ref()).await;
    state.cookie_jar(cookies).clear();
    Redirect::to("/")
}
