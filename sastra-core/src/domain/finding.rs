//! Findings reported by the scanning engine

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Finding severity as exposed by the API
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Map an engine-reported severity label to the API severity set.
    ///
    /// Returns `None` for labels outside the engine's documented
    /// INFO/WARNING/ERROR vocabulary; callers decide the fallback.
    pub fn from_engine_label(label: &str) -> Option<Self> {
        match label.to_uppercase().as_str() {
            "INFO" | "INVENTORY" | "EXPERIMENT" => Some(Severity::Info),
            "WARNING" => Some(Severity::Warning),
            "ERROR" => Some(Severity::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported issue in scanned content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Finding {
    /// Rule that triggered
    pub rule_id: String,
    /// Human-readable message from the rule
    pub message: String,
    pub severity: Severity,
    /// Path as the caller submitted it, not the workspace-internal name
    pub path: String,
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}
