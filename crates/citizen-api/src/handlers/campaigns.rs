use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use citizen_core::domain::{Campaign, Donation, NewDonation};
use citizen_core::services::CivicService;

use crate::extract::SessionContext;
use crate::handlers::{created, ApiResult, CreatedResult};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CampaignView {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub progress_percent: f64,
}

/// GET /api/campaigns
pub async fn list_campaigns(State(state): State<AppState>, session: SessionContext) -> ApiResult<Vec<CampaignView>> {
    let client = session.client(&state);
    let campaigns = CivicService::verified_campaigns(client.as_ref())
        .await?
        .into_iter()
        .map(|campaign| CampaignView {
            progress_percent: campaign.progress_percent(),
            campaign,
        })
        .collect();
    Ok(Json(ApiResponse::success(campaigns)))
}

/// POST /api/campaigns/{id}/donations
pub async fn donate(
    State(state): State<AppState>,
    session: SessionContext,
    Path(campaign_id): Path<Uuid>,
    Json(form): Json<NewDonation>,
) -> CreatedResult<Donation> {
    let client = session.client(&state);
    let donation =
        CivicService::donate(client.as_ref(), campaign_id, session.user.as_ref(), form).await?;
    Ok(created(donation))
}
