//! Route definitions and server setup

use std::time::Duration;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use sastra_core::Config;
use sastra_core::config::ServerConfig;

use crate::app::AppState;
use crate::presentation::{
    controllers::{
        health::health_check,
        rules::list_rules,
        scan::{scan, scan_bulk, scan_upload},
    },
    middleware::require_api_key,
    models::*,
};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::controllers::scan::scan,
        crate::presentation::controllers::scan::scan_bulk,
        crate::presentation::controllers::scan::scan_upload,
        crate::presentation::controllers::health::health_check,
        crate::presentation::controllers::rules::list_rules
    ),
    components(
        schemas(
            SnippetScanRequest,
            BulkScanRequest,
            BulkScanFile,
            ScanResult,
            ScanStats,
            Finding,
            Severity,
            HealthResponse,
            RulesResponse,
            CustomRuleDto,
            ErrorResponse
        )
    ),
    tags(
        (name = "scan", description = "Submit code for security scanning"),
        (name = "health", description = "Service health and engine detection"),
        (name = "rules", description = "Accepted rule configurations")
    )
)]
pub struct ApiDoc;

/// Build the application router with all layers applied
pub fn create_router(state: AppState, config: &Config) -> Router {
    // Scan routes sit behind the optional shared secret; health and rules
    // stay open for probes and discovery.
    let scan_routes = Router::new()
        .route("/scan", post(scan))
        .route("/scan/bulk", post(scan_bulk))
        .route("/scan/upload", post(scan_upload))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    let mut router = Router::new()
        .merge(scan_routes)
        .route("/health", get(health_check))
        .route("/rules", get(list_rules));

    // Conditionally expose Swagger UI (avoid leaking docs in production).
    if config.server.enable_docs {
        router =
            router.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.server))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.server.request_timeout_seconds,
                ))),
        )
        .layer(axum::extract::DefaultBodyLimit::max(body_limit(config)))
        .with_state(state)
}

/// Build the CORS layer from configuration
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let layer = if server.allowed_origins.len() == 1 && server.allowed_origins[0] == "*" {
        CorsLayer::new().allow_origin(tower_http::cors::AllowOrigin::mirror_request())
    } else {
        let mut layer = CorsLayer::new();
        for origin in &server.allowed_origins {
            match axum::http::HeaderValue::from_str(origin) {
                Ok(origin_header) => {
                    layer = layer.allow_origin(origin_header);
                }
                Err(_) => {
                    tracing::warn!(origin, "Invalid CORS origin in config; skipping");
                }
            }
        }
        layer
    };

    layer
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            axum::http::HeaderName::from_static("x-api-key"),
        ])
        .allow_credentials(false)
        .max_age(Duration::from_secs(3600))
}

/// Request body ceiling: the configured content limit plus framing headroom
/// for JSON escaping and multipart boundaries.
fn body_limit(config: &Config) -> usize {
    (config.limits.max_request_bytes as usize).saturating_mul(2)
}
