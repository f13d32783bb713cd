//! Router-level tests driven through `tower::ServiceExt::oneshot`
//!
//! A fake engine invoker returns canned report JSON, so the full HTTP
//! surface is exercised without a semgrep binary.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use sastra_core::Config;
use sastra_core::config::LimitsConfig;
use sastra_engine::{
    ConcurrencyGuard, EngineInvoker, EngineOutcome, RuleCatalog, RuleConfig, ScanError,
    ScanOrchestrator, WorkspaceManager,
};

use crate::app::AppState;
use crate::presentation::routes::create_router;

struct FakeInvoker {
    report: &'static str,
}

#[async_trait]
impl EngineInvoker for FakeInvoker {
    async fn invoke(
        &self,
        workspace: &Path,
        _rules: &RuleConfig,
    ) -> Result<EngineOutcome, ScanError> {
        Ok(EngineOutcome::Completed {
            exit_code: Some(0),
            stdout: self
                .report
                .replace("{root}", &workspace.display().to_string())
                .into_bytes(),
            stderr: Vec::new(),
        })
    }

    async fn version(&self) -> Result<String, ScanError> {
        Ok("1.99.0-test".to_string())
    }
}

const EMPTY_REPORT: &str = r#"{"results": [], "errors": [], "paths": {"scanned": []}}"#;

const DANGEROUS_SNIPPET_REPORT: &str = r#"{
    "results": [{
        "check_id": "python.lang.security.audit.dangerous-system-call",
        "path": "{root}/snippet.py",
        "start": {"line": 2, "col": 1},
        "end": {"line": 2, "col": 25},
        "extra": {"message": "Found os.system call", "severity": "ERROR"}
    }],
    "errors": [],
    "paths": {"scanned": ["{root}/snippet.py"]}
}"#;

const UPLOAD_REPORT: &str = r#"{
    "results": [{
        "check_id": "python.lang.security.audit.dangerous-system-call",
        "path": "{root}/app.py",
        "start": {"line": 2, "col": 1},
        "end": {"line": 2, "col": 20},
        "extra": {"message": "Found os.system call", "severity": "ERROR"}
    }],
    "errors": [],
    "paths": {"scanned": ["{root}/app.py"]}
}"#;

struct TestApp {
    router: Router,
    guard: Arc<ConcurrencyGuard>,
}

fn test_app(report: &'static str, api_key: Option<&str>) -> TestApp {
    let mut config = Config::default();
    config.server.enable_docs = false;
    config.server.api_key = api_key.map(str::to_string);

    let limits = LimitsConfig::default();
    let guard = Arc::new(ConcurrencyGuard::new(1, limits.admission_timeout()));
    let orchestrator = Arc::new(ScanOrchestrator::new(
        Arc::new(FakeInvoker { report }),
        guard.clone(),
        RuleCatalog::from_config(&config.engine),
        WorkspaceManager::new(limits.max_file_bytes),
        limits,
    ));

    let state = AppState {
        orchestrator,
        catalog: RuleCatalog::from_config(&config.engine),
        engine_version: Some("1.99.0-test".to_string()),
        started_at: Instant::now(),
        api_key: config.server.api_key.clone(),
    };

    TestApp {
        router: create_router(state, &config),
        guard,
    }
}

fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_engine_version() {
    let app = test_app(EMPTY_REPORT, None);
    let response = app
        .router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["engine_version"], "1.99.0-test");
    assert!(body["uptime_seconds"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn rules_lists_configured_packs() {
    let app = test_app(EMPTY_REPORT, None);
    let response = app
        .router
        .oneshot(Request::get("/rules").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let packs = body["rule_packs"].as_array().unwrap();
    assert!(packs.iter().any(|p| p == "p/security-audit"));
    assert!(body["total"].as_u64().unwrap() >= packs.len() as u64);
}

#[tokio::test]
async fn scan_returns_findings_for_dangerous_code() {
    let app = test_app(DANGEROUS_SNIPPET_REPORT, None);
    let response = app
        .router
        .oneshot(json_request(
            "/scan",
            serde_json::json!({
                "code": "import os\nos.system(\"rm -rf /\")",
                "language": "python"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["findings"][0]["severity"], "ERROR");
    assert_eq!(body["findings"][0]["path"], "snippet.py");
    assert_eq!(body["errors"].as_array().unwrap().len(), 0);
    assert!(body["execution_time"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn scan_returns_no_findings_for_clean_code() {
    let app = test_app(EMPTY_REPORT, None);
    let response = app
        .router
        .oneshot(json_request(
            "/scan",
            serde_json::json!({"code": "print('hello')", "language": "python"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["findings"].as_array().unwrap().len(), 0);
    assert_eq!(body["errors"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn scan_rejects_unknown_language() {
    let app = test_app(EMPTY_REPORT, None);
    let response = app
        .router
        .oneshot(json_request(
            "/scan",
            serde_json::json!({"code": "x", "language": "cobol"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INVALID_INPUT");
    assert!(body["request_id"].as_str().is_some());
}

#[tokio::test]
async fn scan_rejects_unknown_rule_config() {
    let app = test_app(EMPTY_REPORT, None);
    let response = app
        .router
        .oneshot(json_request(
            "/scan",
            serde_json::json!({"code": "x = 1", "language": "python", "config": "p/unknown"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INVALID_CONFIG");
}

#[tokio::test]
async fn bulk_scan_rejects_duplicate_filenames() {
    let app = test_app(EMPTY_REPORT, None);
    let response = app
        .router
        .oneshot(json_request(
            "/scan/bulk",
            serde_json::json!({
                "files": [
                    {"filename": "a.py", "content": "x = 1"},
                    {"filename": "a.py", "content": "y = 2"}
                ]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn scan_is_rejected_while_the_permit_pool_is_drained() {
    let app = test_app(EMPTY_REPORT, None);
    let _held = app.guard.acquire().await.unwrap();

    let response = app
        .router
        .oneshot(json_request(
            "/scan",
            serde_json::json!({"code": "x = 1", "language": "python"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(response).await;
    assert_eq!(body["code"], "OVERLOADED");
    assert_eq!(body["details"]["retryable"], true);
}

#[tokio::test]
async fn scan_requires_api_key_when_configured() {
    let app = test_app(EMPTY_REPORT, Some("super-secret-key-0123"));
    let response = app
        .router
        .oneshot(json_request(
            "/scan",
            serde_json::json!({"code": "x = 1", "language": "python"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn scan_accepts_matching_api_key() {
    let app = test_app(EMPTY_REPORT, Some("super-secret-key-0123"));
    let request = Request::builder()
        .method("POST")
        .uri("/scan")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-api-key", "super-secret-key-0123")
        .body(Body::from(
            serde_json::json!({"code": "x = 1", "language": "python"}).to_string(),
        ))
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_stays_open_when_api_key_is_configured() {
    let app = test_app(EMPTY_REPORT, Some("super-secret-key-0123"));
    let response = app
        .router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn upload_scans_multipart_files_under_their_declared_names() {
    let app = test_app(UPLOAD_REPORT, None);

    let boundary = "sastra-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"files\"; filename=\"app.py\"\r\n\
         Content-Type: text/x-python\r\n\r\n\
         import os\nos.system('ls')\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"config\"\r\n\r\n\
         auto\r\n\
         --{boundary}--\r\n"
    );

    let request = Request::builder()
        .method("POST")
        .uri("/scan/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["findings"][0]["path"], "app.py");
    assert_eq!(body["files_scanned"][0], "app.py");
}

#[tokio::test]
async fn upload_without_any_files_is_invalid() {
    let app = test_app(EMPTY_REPORT, None);

    let boundary = "sastra-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"config\"\r\n\r\n\
         auto\r\n\
         --{boundary}--\r\n"
    );

    let request = Request::builder()
        .method("POST")
        .uri("/scan/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
