//! Mapping from scan failures to HTTP responses
//!
//! Every [`ScanError`] kind has a fixed status and a machine-readable code
//! so clients can branch without parsing messages. Nothing is swallowed on
//! the way up: the orchestration error text is the response message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use uuid::Uuid;

use sastra_engine::ScanError;

use super::models::ErrorResponse;

/// Wrapper making [`ScanError`] usable as an axum rejection
#[derive(Debug)]
pub struct ApiError(pub ScanError);

impl From<ScanError> for ApiError {
    fn from(err: ScanError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ScanError::InvalidInput(_) | ScanError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            ScanError::Overloaded => StatusCode::TOO_MANY_REQUESTS,
            ScanError::ResourceExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
            ScanError::EngineTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ScanError::EngineError { .. } | ScanError::NormalizationError(_) => {
                StatusCode::BAD_GATEWAY
            }
            ScanError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let request_id = Uuid::new_v4();

        if status.is_server_error() {
            tracing::error!(%request_id, code = self.0.code(), error = %self.0, "Scan request failed");
        } else {
            tracing::debug!(%request_id, code = self.0.code(), error = %self.0, "Scan request rejected");
        }

        let body = ErrorResponse {
            code: self.0.code().to_string(),
            message: self.0.to_string(),
            details: self
                .0
                .is_retryable()
                .then(|| serde_json::json!({ "retryable": true })),
            request_id,
            timestamp: Utc::now(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn status_mapping_matches_contract() {
        let cases = [
            (ScanError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (ScanError::InvalidConfig("x".into()), StatusCode::BAD_REQUEST),
            (ScanError::Overloaded, StatusCode::TOO_MANY_REQUESTS),
            (
                ScanError::ResourceExhausted("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ScanError::EngineTimeout {
                    elapsed: Duration::from_secs(1),
                },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                ScanError::EngineError {
                    exit_code: Some(2),
                    detail: "x".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                ScanError::NormalizationError("x".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ScanError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }
}
