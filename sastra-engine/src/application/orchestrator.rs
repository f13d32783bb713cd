//! Scan orchestration
//!
//! The single entry point that drives a scan request through admission,
//! workspace preparation, engine invocation, and result normalization.
//! Stage order matters: validation and rule resolution run before any
//! resource is allocated, the permit is held for the whole invocation,
//! and workspace destruction plus permit release happen exactly once per
//! request on every path (both are RAII; the happy path destroys the
//! workspace explicitly so removal failures reach the logs).

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};

use sastra_core::config::LimitsConfig;
use sastra_core::domain::{ScanRequest, ScanResult, SourceFile};

use crate::application::guard::ConcurrencyGuard;
use crate::domain::errors::ScanError;
use crate::domain::invocation::EngineOutcome;
use crate::domain::traits::EngineInvoker;
use crate::infrastructure::catalog::RuleCatalog;
use crate::infrastructure::semgrep::ResultNormalizer;
use crate::infrastructure::workspace::WorkspaceManager;

/// Orchestrates one engine invocation per scan request
pub struct ScanOrchestrator {
    invoker: Arc<dyn EngineInvoker>,
    guard: Arc<ConcurrencyGuard>,
    catalog: RuleCatalog,
    workspaces: WorkspaceManager,
    normalizer: ResultNormalizer,
    limits: LimitsConfig,
}

impl ScanOrchestrator {
    pub fn new(
        invoker: Arc<dyn EngineInvoker>,
        guard: Arc<ConcurrencyGuard>,
        catalog: RuleCatalog,
        workspaces: WorkspaceManager,
        limits: LimitsConfig,
    ) -> Self {
        Self {
            invoker,
            guard,
            catalog,
            workspaces,
            normalizer: ResultNormalizer::new(),
            limits,
        }
    }

    /// Run one scan request to completion or a typed failure.
    #[instrument(skip(self, request), fields(kind = request.kind()))]
    pub async fn scan(&self, request: ScanRequest) -> Result<ScanResult, ScanError> {
        let started = Instant::now();

        let rules = self.catalog.resolve(request.rule_config())?;
        let files = self.validate(request)?;

        let _permit = self.guard.acquire().await?;

        let mut workspace = self.workspaces.create()?;
        for file in &files {
            workspace.write(&file.filename, &file.content).await?;
        }

        let outcome = self.invoker.invoke(workspace.root(), &rules).await?;

        let result = match outcome {
            EngineOutcome::Completed {
                exit_code,
                stdout,
                stderr,
            } => self
                .normalizer
                .normalize(&stdout, &stderr, exit_code, &workspace),
            EngineOutcome::TimedOut { elapsed } => {
                warn!(?elapsed, "Engine invocation timed out");
                Err(ScanError::EngineTimeout { elapsed })
            }
            EngineOutcome::SpawnFailed { message } => Err(ScanError::EngineError {
                exit_code: None,
                detail: format!("Failed to start engine: {message}"),
            }),
        };

        workspace.destroy();

        let mut result = result?;
        result.execution_time = started.elapsed().as_secs_f64();

        info!(
            findings = result.stats.total_findings,
            files = result.stats.files_scanned,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Scan completed"
        );
        Ok(result)
    }

    /// Engine version as detected by the invoker, for health reporting
    pub async fn engine_version(&self) -> Result<String, ScanError> {
        self.invoker.version().await
    }

    /// Validate request shape and size and flatten it into the files to
    /// materialize. Runs before any permit or workspace exists.
    fn validate(&self, request: ScanRequest) -> Result<Vec<SourceFile>, ScanError> {
        match request {
            ScanRequest::Single { code, language, .. } => {
                if code.trim().is_empty() {
                    return Err(ScanError::InvalidInput("Code must not be empty".into()));
                }
                if code.len() as u64 > self.limits.max_snippet_bytes {
                    return Err(ScanError::InvalidInput(format!(
                        "Code exceeds the snippet limit of {} bytes",
                        self.limits.max_snippet_bytes
                    )));
                }
                let filename = format!("snippet.{}", language.extension());
                Ok(vec![SourceFile::new(filename, code.into_bytes())])
            }
            ScanRequest::Bulk { files, .. } | ScanRequest::Upload { files, .. } => {
                self.validate_files(files)
            }
        }
    }

    fn validate_files(&self, files: Vec<SourceFile>) -> Result<Vec<SourceFile>, ScanError> {
        if files.is_empty() {
            return Err(ScanError::InvalidInput(
                "At least one file is required".into(),
            ));
        }
        if files.len() > self.limits.max_files_per_request {
            return Err(ScanError::InvalidInput(format!(
                "Too many files: {} exceeds the limit of {}",
                files.len(),
                self.limits.max_files_per_request
            )));
        }

        let mut seen = std::collections::HashSet::with_capacity(files.len());
        let mut total: u64 = 0;
        for file in &files {
            if file.filename.trim().is_empty() {
                return Err(ScanError::InvalidInput("Filename must not be empty".into()));
            }
            if !seen.insert(file.filename.as_str()) {
                return Err(ScanError::InvalidInput(format!(
                    "Duplicate filename '{}' in request",
                    file.filename
                )));
            }
            let size = file.content.len() as u64;
            if size > self.limits.max_file_bytes {
                return Err(ScanError::InvalidInput(format!(
                    "File '{}' exceeds the per-file limit of {} bytes",
                    file.filename, self.limits.max_file_bytes
                )));
            }
            total += size;
        }
        if total > self.limits.max_request_bytes {
            return Err(ScanError::InvalidInput(format!(
                "Total content size {} exceeds the request limit of {} bytes",
                total, self.limits.max_request_bytes
            )));
        }

        Ok(files)
    }
}
