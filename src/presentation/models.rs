//! Request and response models for the scanning API
//!
//! Responses reuse the domain result types directly ([`ScanResult`] is the
//! API contract), so only request bodies and envelope types live here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub use sastra_core::domain::{Finding, ScanResult, ScanStats, Severity};

/// Body of `POST /scan`
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SnippetScanRequest {
    /// Code to scan
    #[schema(example = "import os\nos.system('ls')")]
    pub code: String,

    /// Programming language of the snippet
    #[schema(example = "python")]
    pub language: String,

    /// Rule config reference: a configured pack or a custom rule file name
    #[schema(example = "p/security-audit")]
    pub config: Option<String>,
}

/// One file in a bulk scan request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BulkScanFile {
    #[schema(example = "app.py")]
    pub filename: String,
    #[schema(example = "import subprocess\nsubprocess.call(['ls'])")]
    pub content: String,
}

/// Body of `POST /scan/bulk`
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BulkScanRequest {
    pub files: Vec<BulkScanFile>,
    pub config: Option<String>,
}

/// Response of `GET /health`
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when the engine was not detected at startup
    #[schema(example = "healthy")]
    pub status: String,

    /// Service version
    #[schema(example = "0.3.0")]
    pub version: String,

    pub timestamp: DateTime<Utc>,

    /// Detected engine version, when available
    #[schema(example = "1.86.0")]
    pub engine_version: Option<String>,

    /// Seconds since process start
    pub uptime_seconds: f64,
}

/// One custom rule file in the rules listing
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CustomRuleDto {
    #[schema(example = "security-essentials.yml")]
    pub name: String,
    #[schema(example = "rules/custom/security-essentials.yml")]
    pub path: String,
    pub size_bytes: u64,
}

/// Response of `GET /rules`
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RulesResponse {
    /// Registry pack identifiers accepted as `config`
    pub rule_packs: Vec<String>,
    /// Custom rule files accepted as `config`
    pub custom_rules: Vec<CustomRuleDto>,
    pub total: usize,
}

impl From<sastra_engine::RuleListing> for RulesResponse {
    fn from(listing: sastra_engine::RuleListing) -> Self {
        let custom_rules: Vec<CustomRuleDto> = listing
            .custom_rules
            .into_iter()
            .map(|f| CustomRuleDto {
                name: f.name,
                path: f.path,
                size_bytes: f.size_bytes,
            })
            .collect();
        Self {
            total: listing.rule_packs.len() + custom_rules.len(),
            rule_packs: listing.rule_packs,
            custom_rules,
        }
    }
}

/// Error response model
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code
    #[schema(example = "INVALID_INPUT")]
    pub code: String,

    /// Human-readable error message
    #[schema(example = "Too many files: 51 exceeds the limit of 50")]
    pub message: String,

    /// Additional error context
    pub details: Option<serde_json::Value>,

    /// Unique request identifier for tracking and support
    pub request_id: Uuid,

    /// Error occurrence timestamp
    pub timestamp: DateTime<Utc>,
}
