//! Health endpoint

use axum::Json;
use axum::extract::State;
use chrono::Utc;

use crate::app::AppState;
use crate::presentation::models::HealthResponse;

/// GET /health - Liveness and readiness, with the detected engine version
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.engine_version.is_some() {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        engine_version: state.engine_version.clone(),
        uptime_seconds: state.started_at.elapsed().as_secs_f64(),
    })
}
