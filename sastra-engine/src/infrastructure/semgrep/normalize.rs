//! Result normalization
//!
//! Turns raw engine output into the stable [`ScanResult`] shape the API
//! serves, independent of the engine's native schema. The split between
//! failure kinds matters here: unparsable output from a failed engine run
//! is an `EngineError`, unparsable output from a successful run is a
//! `NormalizationError` (an engine/version compatibility signal, not a
//! user error).

use tracing::{debug, warn};

use sastra_core::domain::{Finding, ScanResult, ScanStats, Severity};

use crate::domain::errors::ScanError;
use crate::infrastructure::workspace::Workspace;

use super::output::SemgrepOutput;

/// Parses engine reports and rewrites workspace paths back to
/// caller-supplied names.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultNormalizer;

impl ResultNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize one completed invocation.
    ///
    /// `execution_time` is left at zero; the orchestrator stamps the
    /// request's wall-clock duration.
    pub fn normalize(
        &self,
        raw_stdout: &[u8],
        raw_stderr: &[u8],
        exit_code: Option<i32>,
        workspace: &Workspace,
    ) -> Result<ScanResult, ScanError> {
        let report: SemgrepOutput = match serde_json::from_slice(raw_stdout) {
            Ok(report) => report,
            Err(parse_err) => {
                // A report that parses is trusted whatever the exit code;
                // one that does not is classified by it.
                let stderr = String::from_utf8_lossy(raw_stderr);
                return match exit_code {
                    Some(0) => Err(ScanError::NormalizationError(format!(
                        "Engine exited cleanly but produced unparsable output: {parse_err}"
                    ))),
                    code => Err(ScanError::EngineError {
                        exit_code: code,
                        detail: if stderr.trim().is_empty() {
                            format!("Unparsable engine output: {parse_err}")
                        } else {
                            stderr.trim().to_string()
                        },
                    }),
                };
            }
        };

        let mut unrecognized = 0usize;
        let mut findings = Vec::with_capacity(report.results.len());
        for result in &report.results {
            let severity = match Severity::from_engine_label(&result.extra.severity) {
                Some(severity) => severity,
                None => {
                    unrecognized += 1;
                    warn!(
                        rule_id = %result.check_id,
                        severity = %result.extra.severity,
                        "Unrecognized engine severity, defaulting to WARNING"
                    );
                    Severity::Warning
                }
            };

            findings.push(Finding {
                rule_id: result.check_id.clone(),
                message: result.extra.message.clone(),
                severity,
                path: self.caller_path(workspace, &result.path),
                start_line: result.start.line,
                start_col: result.start.col,
                end_line: result.end.line,
                end_col: result.end.col,
            });
        }

        // Per-file engine errors are non-fatal: the batch still succeeds,
        // the failures travel in the errors array.
        let errors = report
            .errors
            .iter()
            .map(|e| match e.path.as_deref() {
                Some(path) => {
                    format!("{}: {}", self.caller_path(workspace, path), e.message.trim())
                }
                None => e.message.trim().to_string(),
            })
            .collect::<Vec<_>>();

        let files_scanned: Vec<String> = report
            .paths
            .scanned
            .iter()
            .map(|p| self.caller_path(workspace, p))
            .collect();

        let stats = ScanStats {
            files_scanned: files_scanned.len(),
            total_findings: findings.len(),
            rules_run: report.time.as_ref().map(|t| t.rules.len()).unwrap_or(0),
            unrecognized_severities: unrecognized,
        };

        debug!(
            findings = findings.len(),
            errors = errors.len(),
            files_scanned = stats.files_scanned,
            "Normalized engine report"
        );

        Ok(ScanResult {
            findings,
            errors,
            stats,
            execution_time: 0.0,
            files_scanned,
        })
    }

    fn caller_path(&self, workspace: &Workspace, reported: &str) -> String {
        workspace
            .original_name(reported)
            .map(str::to_string)
            .unwrap_or_else(|| reported.to_string())
    }
}
