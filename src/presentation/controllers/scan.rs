//! Scan endpoints

use axum::Json;
use axum::extract::{Multipart, State};

use sastra_core::domain::{Language, ScanRequest, ScanResult, SourceFile};
use sastra_engine::ScanError;

use crate::app::AppState;
use crate::presentation::error::ApiError;
use crate::presentation::models::{BulkScanRequest, SnippetScanRequest};

/// POST /scan - Scan a single code snippet
#[utoipa::path(
    post,
    path = "/scan",
    request_body = SnippetScanRequest,
    responses(
        (status = 200, description = "Scan completed", body = ScanResult),
        (status = 400, description = "Invalid input or rule config", body = crate::presentation::models::ErrorResponse),
        (status = 429, description = "Scanner at capacity, retry later", body = crate::presentation::models::ErrorResponse),
        (status = 502, description = "Engine or normalization failure", body = crate::presentation::models::ErrorResponse),
        (status = 504, description = "Engine timed out", body = crate::presentation::models::ErrorResponse)
    ),
    tag = "scan"
)]
pub async fn scan(
    State(state): State<AppState>,
    Json(body): Json<SnippetScanRequest>,
) -> Result<Json<ScanResult>, ApiError> {
    let language: Language = body
        .language
        .parse()
        .map_err(|e: sastra_core::domain::UnknownLanguage| ScanError::InvalidInput(e.to_string()))?;

    let result = state
        .orchestrator
        .scan(ScanRequest::Single {
            code: body.code,
            language,
            config: body.config,
        })
        .await?;

    Ok(Json(result))
}

/// POST /scan/bulk - Scan an ordered set of files
#[utoipa::path(
    post,
    path = "/scan/bulk",
    request_body = BulkScanRequest,
    responses(
        (status = 200, description = "Scan completed; per-file failures are listed in `errors`", body = ScanResult),
        (status = 400, description = "Invalid input or rule config", body = crate::presentation::models::ErrorResponse),
        (status = 429, description = "Scanner at capacity, retry later", body = crate::presentation::models::ErrorResponse)
    ),
    tag = "scan"
)]
pub async fn scan_bulk(
    State(state): State<AppState>,
    Json(body): Json<BulkScanRequest>,
) -> Result<Json<ScanResult>, ApiError> {
    let files = body
        .files
        .into_iter()
        .map(|f| SourceFile::new(f.filename, f.content))
        .collect();

    let result = state
        .orchestrator
        .scan(ScanRequest::Bulk {
            files,
            config: body.config,
        })
        .await?;

    Ok(Json(result))
}

/// POST /scan/upload - Scan uploaded files (multipart)
///
/// File parts contribute their declared filename and bytes; a part named
/// `config` selects the rule config.
#[utoipa::path(
    post,
    path = "/scan/upload",
    responses(
        (status = 200, description = "Scan completed", body = ScanResult),
        (status = 400, description = "Invalid upload or rule config", body = crate::presentation::models::ErrorResponse),
        (status = 429, description = "Scanner at capacity, retry later", body = crate::presentation::models::ErrorResponse)
    ),
    tag = "scan"
)]
pub async fn scan_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ScanResult>, ApiError> {
    let mut files: Vec<SourceFile> = Vec::new();
    let mut config: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ScanError::InvalidInput(format!("Malformed multipart body: {e}")))?
    {
        if field.name() == Some("config") && field.file_name().is_none() {
            let value = field
                .text()
                .await
                .map_err(|e| ScanError::InvalidInput(format!("Unreadable config field: {e}")))?;
            config = Some(value);
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ScanError::InvalidInput("Upload part is missing a filename".into()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ScanError::InvalidInput(format!("Unreadable upload part: {e}")))?;
        files.push(SourceFile::new(filename, bytes.to_vec()));
    }

    let result = state
        .orchestrator
        .scan(ScanRequest::Upload { files, config })
        .await?;

    Ok(Json(result))
}
