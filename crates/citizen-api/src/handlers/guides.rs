use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use citizen_core::domain::{Category, Guide, GuideSuggestion};
use citizen_core::services::CivicService;

use crate::extract::SessionContext;
use crate::handlers::ApiResult;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GuideSearchQuery {
    pub q: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /api/categories
pub async fn list_categories(State(state): State<AppState>, session: SessionContext) -> ApiResult<Vec<Category>> {
    let client = session.client(&state);
    let categories = CivicService::categories(client.as_ref()).await?;
    Ok(Json(ApiResponse::success(categories)))
}

/// GET /api/guides?q=&category=
pub async fn search_guides(
    State(state): State<AppState>,
    session: SessionContext,
    Query(query): Query<GuideSearchQuery>,
) -> ApiResult<Vec<Guide>> {
    let client = session.client(&state);
    let guides =
        CivicService::search_guides(client.as_ref(), query.q.as_deref(), query.category.as_deref())
            .await?;
    Ok(Json(ApiResponse::success(guides)))
}

/// GET /api/guides/suggest?q=
pub async fn suggest_guides(
    State(state): State<AppState>,
    session: SessionContext,
    Query(query): Query<SuggestQuery>,
) -> ApiResult<Vec<GuideSuggestion>> {
    let client = session.client(&state);
    let suggestions = CivicService::suggest_guides(client.as_ref(), &query.q).await?;
    Ok(Json(ApiResponse::success(suggestions)))
}

/// GET /api/guides/{slug}
pub async fn guide_detail(
    State(state): State<AppState>,
    session: SessionContext,
    Path(slug): Path<String>,
) -> ApiResult<Guide> {
    let client = session.client(&state);
    let guide = CivicService::guide_by_slug(client.as_ref(), &slug).await?;
    Ok(Json(ApiResponse::success(guide)))
}
