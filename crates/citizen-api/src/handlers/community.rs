//! Volunteer sign-ups and the contact form

use axum::{extract::State, Json};

use citizen_core::domain::{ContactMessage, Volunteer};
use citizen_core::services::CivicService;

use crate::extract::SessionContext;
use crate::handlers::{created, CreatedResult};
use crate::state::AppState;

/// POST /api/volunteers
pub async fn register_volunteer(
    State(state): State<AppState>,
    session: SessionContext,
    Json(volunteer): Json<Volunteer>,
) -> CreatedResult<Volunteer> {
    let client = session.client(&state);
    let saved =
        CivicService::register_volunteer(client.as_ref(), session.user.as_ref(), volunteer).await?;
    Ok(created(saved))
}

/// POST /api/contact
pub async fn send_contact_message(
    State(state): State<AppState>,
    session: SessionContext,
    Json(message): Json<ContactMessage>,
) -> CreatedResult<ContactMessage> {
    let client = session.client(&state);
    let saved = CivicService::send_contact_message(client.as_ref(), message).await?;
    Ok(created(saved))
}
