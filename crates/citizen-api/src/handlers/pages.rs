//! Signed-in pages: dashboard, profile, admin

use axum::{extract::State, Json};
use serde::Serialize;

use citizen_core::domain::ContactMessage;
use citizen_core::ports::BackendKind;
use citizen_core::services::CivicService;
use citizen_shared::constants::DEFAULT_PAGE_SIZE;

use crate::error::ApiError;
use crate::extract::{CurrentUser, SessionContext};
use crate::handlers::ApiResult;
use crate::response::{ApiResponse, UserView};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub user: UserView,
    pub donor_registrations: usize,
    pub backend: BackendKind,
}

#[derive(Debug, Serialize)]
pub struct AdminView {
    pub contact_messages: Vec<ContactMessage>,
}

/// GET /dashboard
pub async fn dashboard(State(state): State<AppState>, session: SessionContext) -> ApiResult<DashboardView> {
    let user = session.require_user()?;
    let client = session.client(&state);
    let donor_registrations = CivicService::donor_registrations(client.as_ref(), user).await?;

    Ok(Json(ApiResponse::success(DashboardView {
        user: UserView::from(user),
        donor_registrations,
        backend: client.kind(),
    })))
}

/// GET /profile
pub async fn profile(CurrentUser(user): CurrentUser) -> Json<ApiResponse<UserView>> {
    Json(ApiResponse::success(UserView::from(&user)))
}

/// GET /admin
///
/// The session gate only guarantees a signed-in user; the role is checked here.
pub async fn admin(State(state): State<AppState>, session: SessionContext) -> ApiResult<AdminView> {
    let user = session.require_user()?;
    if !user.is_admin() {
        return Err(ApiError::Forbidden("Administrator role required".to_string()));
    }
    let client = session.client(&state);
    let contact_messages = CivicService::contact_messages(client.as_ref(), DEFAULT_PAGE_SIZE * 5).await?;
    Ok(Json(ApiResponse::success(AdminView { contact_messages })))
}
