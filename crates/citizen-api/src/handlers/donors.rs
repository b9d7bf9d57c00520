//! Blood donor registry and blood requests

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use citizen_core::domain::{BloodDonor, BloodRequest, NewDonor};
use citizen_core::services::CivicService;

use crate::extract::SessionContext;
use crate::handlers::{created, ApiResult, CreatedResult};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DonorSearchQuery {
    pub blood_group: Option<String>,
    pub city: Option<String>,
}

/// GET /api/donors?blood_group=&city=
pub async fn list_donors(
    State(state): State<AppState>,
    session: SessionContext,
    Query(query): Query<DonorSearchQuery>,
) -> ApiResult<Vec<BloodDonor>> {
    let client = session.client(&state);
    let donors =
        CivicService::find_donors(client.as_ref(), query.blood_group.as_deref(), query.city.as_deref())
            .await?;
    Ok(Json(ApiResponse::success(donors)))
}

/// POST /api/donors
pub async fn register_donor(
    State(state): State<AppState>,
    session: SessionContext,
    Json(form): Json<NewDonor>,
) -> CreatedResult<BloodDonor> {
    let user = session.require_user()?;
    let client = session.client(&state);
    let donor = CivicService::register_donor(client.as_ref(), user, form).await?;
    Ok(created(donor))
}

/// POST /api/blood-requests
pub async fn request_blood(
    State(state): State<AppState>,
    session: SessionContext,
    Json(request): Json<BloodRequest>,
) -> CreatedResult<BloodRequest> {
    let client = session.client(&state);
    let saved = CivicService::request_blood(client.as_ref(), session.user.as_ref(), request).await?;
    Ok(created(saved))
}
