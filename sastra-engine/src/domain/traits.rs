//! Seams between the orchestration core and the external engine

use std::path::Path;

use async_trait::async_trait;

use super::errors::ScanError;
use super::invocation::{EngineOutcome, RuleConfig};

/// Abstract "run the engine against a directory and capture output"
/// capability.
///
/// The orchestrator depends only on this trait; production wires in
/// [`crate::infrastructure::semgrep::SemgrepInvoker`], tests wire in fakes
/// that return canned outcomes without spawning processes.
#[async_trait]
pub trait EngineInvoker: Send + Sync {
    /// Run the engine rooted at `workspace` with the given rule set.
    ///
    /// Implementations must never let the subprocess outlive the returned
    /// future: timeout, cancellation, and drop all terminate it.
    async fn invoke(&self, workspace: &Path, rules: &RuleConfig)
    -> Result<EngineOutcome, ScanError>;

    /// Detect the engine version, for health reporting
    async fn version(&self) -> Result<String, ScanError>;
}
