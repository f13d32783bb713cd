//! Rules listing endpoint

use axum::Json;
use axum::extract::State;

use crate::app::AppState;
use crate::presentation::models::RulesResponse;

/// GET /rules - Accepted rule packs and custom rule files (read-only)
#[utoipa::path(
    get,
    path = "/rules",
    responses(
        (status = 200, description = "Configured rule packs and custom rule files", body = RulesResponse)
    ),
    tag = "rules"
)]
pub async fn list_rules(State(state): State<AppState>) -> Json<RulesResponse> {
    Json(state.catalog.list().into())
}
