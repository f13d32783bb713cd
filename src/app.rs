//! Application setup and wiring

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tokio_util::sync::CancellationToken;

use sastra_core::Config;
use sastra_engine::{
    ConcurrencyGuard, RuleCatalog, ScanOrchestrator, SemgrepInvoker, WorkspaceManager,
};

use crate::presentation::routes::create_router;

/// Handle returned from create_app for graceful shutdown coordination
pub struct AppHandle {
    pub router: Router,
    pub shutdown_token: CancellationToken,
}

/// Shared state behind every HTTP handler
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ScanOrchestrator>,
    pub catalog: RuleCatalog,
    /// Engine version detected at startup; `None` when the probe failed
    pub engine_version: Option<String>,
    pub started_at: Instant,
    pub api_key: Option<String>,
}

/// Build the router and its dependencies from immutable configuration.
///
/// The engine version is probed once here; the health endpoint serves the
/// cached value and never spawns a process itself.
pub async fn create_app(config: Config) -> AppHandle {
    let invoker = Arc::new(SemgrepInvoker::new(config.engine.clone()));
    let guard = Arc::new(ConcurrencyGuard::new(
        config.limits.max_concurrent_scans,
        config.limits.admission_timeout(),
    ));
    let catalog = RuleCatalog::from_config(&config.engine);
    let orchestrator = Arc::new(ScanOrchestrator::new(
        invoker,
        guard,
        catalog.clone(),
        WorkspaceManager::new(config.limits.max_file_bytes),
        config.limits.clone(),
    ));

    let engine_version = match orchestrator.engine_version().await {
        Ok(version) => {
            tracing::info!(version = %version, "Scanning engine detected");
            Some(version)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Scanning engine not available; health will report degraded");
            None
        }
    };

    let state = AppState {
        orchestrator,
        catalog,
        engine_version,
        started_at: Instant::now(),
        api_key: config.server.api_key.clone(),
    };

    AppHandle {
        router: create_router(state, &config),
        shutdown_token: CancellationToken::new(),
    }
}
