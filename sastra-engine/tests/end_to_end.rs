//! End-to-end orchestration through the crate's public API
//!
//! Uses a scripted invoker so no engine binary is required; the invoker
//! inspects the materialized workspace exactly as the real engine would.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use sastra_core::config::{EngineConfig, LimitsConfig};
use sastra_core::domain::{Language, ScanRequest, Severity, SourceFile};
use sastra_engine::{
    ConcurrencyGuard, EngineInvoker, EngineOutcome, RuleCatalog, RuleConfig, ScanError,
    ScanOrchestrator, WorkspaceManager,
};

/// Emits one ERROR finding per workspace file containing `os.system`,
/// mirroring how the engine walks the scan target.
struct ScriptedEngine;

#[async_trait]
impl EngineInvoker for ScriptedEngine {
    async fn invoke(
        &self,
        workspace: &Path,
        rules: &RuleConfig,
    ) -> Result<EngineOutcome, ScanError> {
        assert!(workspace.is_dir(), "workspace must exist during invocation");
        assert_eq!(rules, &RuleConfig::Registry("auto".into()));

        let mut results = Vec::new();
        let mut scanned = Vec::new();
        let mut entries: Vec<_> = std::fs::read_dir(workspace)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        entries.sort();

        for path in entries {
            if !path.is_file() {
                continue;
            }
            scanned.push(path.display().to_string());
            let content = std::fs::read_to_string(&path).unwrap_or_default();
            if let Some(line) = content.lines().position(|l| l.contains("os.system")) {
                results.push(serde_json::json!({
                    "check_id": "python.lang.security.audit.dangerous-system-call",
                    "path": path.display().to_string(),
                    "start": {"line": line + 1, "col": 1},
                    "end": {"line": line + 1, "col": 20},
                    "extra": {"message": "Found os.system call", "severity": "ERROR"}
                }));
            }
        }

        let report = serde_json::json!({
            "results": results,
            "errors": [],
            "paths": {"scanned": scanned}
        });

        Ok(EngineOutcome::Completed {
            exit_code: Some(0),
            stdout: report.to_string().into_bytes(),
            stderr: Vec::new(),
        })
    }

    async fn version(&self) -> Result<String, ScanError> {
        Ok("1.99.0-test".to_string())
    }
}

fn orchestrator(workspace_parent: &Path) -> ScanOrchestrator {
    let limits = LimitsConfig::default();
    ScanOrchestrator::new(
        Arc::new(ScriptedEngine),
        Arc::new(ConcurrencyGuard::new(
            limits.max_concurrent_scans,
            limits.admission_timeout(),
        )),
        RuleCatalog::from_config(&EngineConfig::default()),
        WorkspaceManager::new(limits.max_file_bytes).with_root(workspace_parent),
        limits,
    )
}

#[tokio::test]
async fn snippet_scan_round_trips_through_a_real_workspace() {
    let parent = tempfile::tempdir().unwrap();
    let orchestrator = orchestrator(parent.path());

    let result = orchestrator
        .scan(ScanRequest::Single {
            code: "import os\nos.system(\"rm -rf /\")".into(),
            language: Language::Python,
            config: None,
        })
        .await
        .unwrap();

    assert_eq!(result.findings.len(), 1);
    assert_eq!(result.findings[0].severity, Severity::Error);
    assert_eq!(result.findings[0].path, "snippet.py");
    assert_eq!(result.findings[0].start_line, 2);
    assert_eq!(result.files_scanned, vec!["snippet.py"]);

    // The workspace is gone once the scan returns.
    assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn concurrent_scans_leave_no_workspaces_behind() {
    let parent = tempfile::tempdir().unwrap();
    let orchestrator = Arc::new(orchestrator(parent.path()));

    let mut handles = Vec::new();
    for i in 0..8 {
        let orchestrator = orchestrator.clone();
        handles.push(tokio::spawn(async move {
            orchestrator
                .scan(ScanRequest::Bulk {
                    files: vec![
                        SourceFile::new(format!("safe_{i}.py"), "print('ok')"),
                        SourceFile::new(format!("risky_{i}.py"), "import os\nos.system('ls')"),
                    ],
                    config: None,
                })
                .await
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.stats.files_scanned, 2);
        assert!(result.findings[0].path.starts_with("risky_"));
    }

    assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 0);
}
