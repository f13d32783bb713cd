//! Request middleware

use axum::Json;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use uuid::Uuid;

use crate::app::AppState;
use crate::presentation::models::ErrorResponse;

/// Header carrying the shared secret
pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject scan requests without the configured shared secret.
///
/// A no-op when no `server.api_key` is configured. Applied to the scan
/// routes only; health and rules stay open for probes and discovery.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.api_key.as_deref() else {
        return next.run(request).await;
    };

    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if presented == Some(expected) {
        return next.run(request).await;
    }

    let body = ErrorResponse {
        code: "UNAUTHORIZED".to_string(),
        message: format!("Missing or invalid {API_KEY_HEADER} header"),
        details: None,
        request_id: Uuid::new_v4(),
        timestamp: Utc::now(),
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
