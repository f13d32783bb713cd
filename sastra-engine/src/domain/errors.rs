//! Scan failure taxonomy
//!
//! Every failure the orchestration core can produce is one of these kinds.
//! None of them is logged-and-swallowed; they propagate to the HTTP layer,
//! which maps [`ScanError::code`] to a status and a machine-readable body.

use std::time::Duration;
use thiserror::Error;

/// Errors produced by the scan orchestration core
#[derive(Debug, Error)]
pub enum ScanError {
    /// Bad request shape, oversized payload, or a path traversal attempt.
    /// Rejected before any resource is allocated.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unknown or unreadable rule-pack reference. Rejected before invocation.
    #[error("Invalid rule config: {0}")]
    InvalidConfig(String),

    /// No invocation permit became available within the admission window.
    #[error("Scanner is at capacity, retry later")]
    Overloaded,

    /// Workspace could not be created (disk/inode limits).
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// The engine subprocess exceeded its wall-clock deadline and was killed.
    #[error("Engine timed out after {elapsed:.1?}")]
    EngineTimeout { elapsed: Duration },

    /// The engine failed to start or exited without usable output.
    #[error("Engine failed{}: {detail}", .exit_code.map(|c| format!(" (exit code {c})")).unwrap_or_default())]
    EngineError {
        exit_code: Option<i32>,
        detail: String,
    },

    /// The engine exited successfully but its output could not be parsed.
    /// Distinct from [`ScanError::EngineError`] so engine/version
    /// compatibility problems are diagnosable as such.
    #[error("Engine output could not be normalized: {0}")]
    NormalizationError(String),

    /// Unexpected internal fault
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScanError {
    /// Stable machine-readable error kind carried in API error envelopes
    pub fn code(&self) -> &'static str {
        match self {
            ScanError::InvalidInput(_) => "INVALID_INPUT",
            ScanError::InvalidConfig(_) => "INVALID_CONFIG",
            ScanError::Overloaded => "OVERLOADED",
            ScanError::ResourceExhausted(_) => "RESOURCE_EXHAUSTED",
            ScanError::EngineTimeout { .. } => "ENGINE_TIMEOUT",
            ScanError::EngineError { .. } => "ENGINE_ERROR",
            ScanError::NormalizationError(_) => "NORMALIZATION_ERROR",
            ScanError::Internal(_) => "INTERNAL",
        }
    }

    /// Whether the caller may retry the identical request later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ScanError::Overloaded | ScanError::ResourceExhausted(_)
        )
    }
}
