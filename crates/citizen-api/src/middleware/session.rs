// ============================================================================
// Citizen API - Session Gate
// File: crates/citizen-api/src/middleware/session.rs
// ============================================================================
//! Per-request session refresh and route gating.
//!
//! Protected paths need a session and send anonymous visitors to the login
//! page with a `next` back-link. Auth paths send signed-in users to the
//! dashboard. The gate stays out of the way entirely while the backend is
//! not configured.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_cookies::Cookies;
use tracing::debug;

use citizen_core::domain::route::is_static_asset;
use citizen_core::domain::RouteClass;
use citizen_core::services::CookieUpdate;
use citizen_security::redirect::login_url_for;
use citizen_security::SessionCookieJar;
use citizen_shared::constants::DASHBOARD_PATH;

use crate::extract::{CurrentUser, SessionContext};
use crate::state::AppState;

pub async fn session_gate(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if is_static_asset(&path) {
        return next.run(request).await;
    }

    let status = state.backend.status();
    if !status.is_valid() {
        debug!("Session gate bypassed for {} (backend {})", path, status);
        return next.run(request).await;
    }

    let context = resolve_session(&state, &cookies).await;
    let authenticated = context.user.is_some();

    match RouteClass::classify(&path) {
        RouteClass::Protected if !authenticated => {
            debug!("Anonymous request to {}, redirecting to login", path);
            return Redirect::temporary(&login_url_for(&path)).into_response();
        }
        RouteClass::Auth if authenticated => {
            debug!("Signed-in request to {}, redirecting to dashboard", path);
            return Redirect::temporary(DASHBOARD_PATH).into_response();
        }
        _ => {}
    }

    if let Some(user) = &context.user {
        request.extensions_mut().insert(CurrentUser(user.clone()));
    }
    request.extensions_mut().insert(context);
    next.run(request).await
}

/// Resolves the cookie session and writes any token change back to the jar.
pub(crate) async fn resolve_session(state: &AppState, cookies: &Cookies) -> SessionContext {
    let jar = state.cookie_jar(cookies.clone());
    let tokens = jar.tokens();
    let client = state.backend.client();
    let resolution = state.sessions.resolve(client.as_ref(), &tokens).await;

    let access_token = match &resolution.cookies {
        CookieUpdate::Replace(session) => Some(session.access_token.clone()),
        CookieUpdate::Clear => None,
        CookieUpdate::Unchanged => resolution.user.as_ref().and(tokens.access_token.clone()),
    };
    apply_cookie_update(&jar, &resolution.cookies);

    SessionContext {
        user: resolution.user,
        access_token,
        degraded: resolution.degraded,
    }
}

fn apply_cookie_update(jar: &SessionCookieJar, update: &CookieUpdate) {
    match update {
        CookieUpdate::Unchanged => {}
        CookieUpdate::Replace(session) => {
            jar.store(&session.access_token, &session.refresh_token, session.expires_in);
        }
        CookieUpdate::Clear => jar.clear(),
    }
}
