//! Scan requests and results

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Finding, Language};

/// One file submitted for scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Name as the caller supplied it; findings are reported against this
    pub filename: String,
    pub content: Vec<u8>,
}

impl SourceFile {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// A scan intent, one per HTTP call
#[derive(Debug, Clone)]
pub enum ScanRequest {
    /// One code snippet with a language hint
    Single {
        code: String,
        language: Language,
        config: Option<String>,
    },
    /// An ordered list of (filename, content) pairs
    Bulk {
        files: Vec<SourceFile>,
        config: Option<String>,
    },
    /// Uploaded blobs with declared filenames
    Upload {
        files: Vec<SourceFile>,
        config: Option<String>,
    },
}

impl ScanRequest {
    /// Short label used in logs and spans
    pub fn kind(&self) -> &'static str {
        match self {
            ScanRequest::Single { .. } => "single",
            ScanRequest::Bulk { .. } => "bulk",
            ScanRequest::Upload { .. } => "upload",
        }
    }

    pub fn rule_config(&self) -> Option<&str> {
        match self {
            ScanRequest::Single { config, .. }
            | ScanRequest::Bulk { config, .. }
            | ScanRequest::Upload { config, .. } => config.as_deref(),
        }
    }
}

/// Aggregate statistics for one scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScanStats {
    /// Number of files the engine analyzed
    pub files_scanned: usize,
    pub total_findings: usize,
    /// Number of rules the engine reported timing for; 0 when the engine
    /// omits timing data
    pub rules_run: usize,
    /// Findings whose engine severity fell outside the documented set and
    /// were defaulted to WARNING
    pub unrecognized_severities: usize,
}

/// Normalized result of one scan request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ScanResult {
    /// Findings in engine-reported order; stable for identical input
    pub findings: Vec<Finding>,
    /// Non-fatal engine errors (per-file parse failures and the like)
    pub errors: Vec<String>,
    pub stats: ScanStats,
    /// Wall-clock duration of the whole orchestration, in seconds
    pub execution_time: f64,
    /// Caller-visible names of the files the engine analyzed
    pub files_scanned: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Severity;

    #[test]
    fn request_kind_labels() {
        let single = ScanRequest::Single {
            code: "print('hi')".into(),
            language: Language::Python,
            config: None,
        };
        assert_eq!(single.kind(), "single");

        let bulk = ScanRequest::Bulk {
            files: vec![SourceFile::new("a.py", "x = 1")],
            config: Some("p/python".into()),
        };
        assert_eq!(bulk.kind(), "bulk");
        assert_eq!(bulk.rule_config(), Some("p/python"));
    }

    #[test]
    fn result_serializes_api_shape() {
        let result = ScanResult {
            findings: vec![Finding {
                rule_id: "python.lang.security.dangerous-system-call".into(),
                message: "Found os.system with dynamic input".into(),
                severity: Severity::Error,
                path: "app.py".into(),
                start_line: 2,
                start_col: 1,
                end_line: 2,
                end_col: 20,
            }],
            errors: vec![],
            stats: ScanStats {
                files_scanned: 1,
                total_findings: 1,
                rules_run: 12,
                unrecognized_severities: 0,
            },
            execution_time: 0.45,
            files_scanned: vec!["app.py".into()],
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["findings"][0]["severity"], "ERROR");
        assert_eq!(value["findings"][0]["path"], "app.py");
        assert_eq!(value["stats"]["files_scanned"], 1);
        assert_eq!(value["files_scanned"][0], "app.py");
    }
}
