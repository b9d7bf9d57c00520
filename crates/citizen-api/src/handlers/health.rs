use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use citizen_core::ports::BackendKind;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
    backend: BackendKind,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    status: String,
    backend: BackendKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    server_time: Option<String>,
}

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            backend: state.backend.kind(),
        }),
    )
}

/// Ready once the backend answers a round trip.
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let backend = state.backend.kind();
    match state.backend.client().rpc("server_time", json!({})).await {
        Ok(rows) => {
            let server_time = rows.first().and_then(|row| {
                row.get("now")
                    .and_then(Value::as_str)
                    .or_else(|| row.as_str())
                    .map(str::to_string)
            });
            (
                StatusCode::OK,
                Json(ReadinessResponse {
                    status: "ready".to_string(),
                    backend,
                    server_time,
                }),
            )
        }
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessResponse {
                    status: "unavailable".to_string(),
                    backend,
                    server_time: None,
                }),
            )
        }
    }
}
