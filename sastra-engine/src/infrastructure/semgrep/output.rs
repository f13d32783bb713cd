//! Semgrep output parsing types
//!
//! These types match the JSON report format of the semgrep CLI, reduced to
//! the fields this service consumes. Unknown fields are ignored so newer
//! engine versions do not break parsing; missing fields default so older
//! ones do not either.

use serde::Deserialize;

/// Root semgrep JSON report
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SemgrepOutput {
    /// Findings, in engine order
    #[serde(default)]
    pub results: Vec<SemgrepResult>,
    /// Non-fatal errors encountered during analysis
    #[serde(default)]
    pub errors: Vec<SemgrepReportedError>,
    /// Paths that were scanned or skipped
    #[serde(default)]
    pub paths: SemgrepPaths,
    /// Timing information (present with `--time`)
    #[serde(default)]
    pub time: Option<SemgrepTiming>,
    /// Engine version that produced the report
    #[serde(default)]
    pub version: Option<String>,
}

/// A single semgrep result (finding)
#[derive(Debug, Clone, Deserialize)]
pub struct SemgrepResult {
    /// Rule ID that triggered
    pub check_id: String,
    /// File path where the finding was detected
    pub path: String,
    pub start: Position,
    pub end: Position,
    pub extra: SemgrepResultExtra,
}

/// Position in a file (1-based)
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub col: u32,
}

/// Extra information attached to a result
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SemgrepResultExtra {
    /// Message from the rule
    #[serde(default)]
    pub message: String,
    /// Severity label as the engine reports it
    #[serde(default)]
    pub severity: String,
}

/// Error entry from the report (parse failures, rule problems)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SemgrepReportedError {
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub error_type: Option<serde_json::Value>,
    /// File path, if the error is file-scoped
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub rule_id: Option<String>,
}

/// Scanned and skipped paths
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SemgrepPaths {
    #[serde(default)]
    pub scanned: Vec<String>,
    #[serde(default)]
    pub skipped: Vec<SkippedPath>,
}

/// A path the engine skipped
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkippedPath {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub reason: String,
}

/// Timing information
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SemgrepTiming {
    #[serde(default)]
    pub total_time: f64,
    #[serde(default)]
    pub rules: Vec<RuleTiming>,
}

/// Timing entry for one rule; only the id is consumed (rule count)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleTiming {
    #[serde(default)]
    pub id: String,
}
