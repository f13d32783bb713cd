//! Configuration management

pub mod validation;

pub use validation::{Validate, ValidationError};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub engine: EngineConfig,
    pub limits: LimitsConfig,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            engine: EngineConfig::default(),
            limits: LimitsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Global request timeout in seconds applied at the HTTP layer. Must
    /// exceed the engine timeout so slow scans fail with an engine error
    /// rather than a dropped connection.
    pub request_timeout_seconds: u64,
    /// Allowed CORS origins. Use ["*"] to allow any (development only).
    pub allowed_origins: Vec<String>,
    /// Whether to expose interactive API docs (Swagger UI). Should be false
    /// in hardened production.
    pub enable_docs: bool,
    /// Optional shared secret. When set, scan endpoints require the
    /// `x-api-key` header to match.
    pub api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_seconds: 330,
            allowed_origins: vec!["*".to_string()],
            enable_docs: true,
            api_key: None,
        }
    }
}

/// External scanning engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Path to the semgrep executable (or "semgrep" if in PATH)
    pub executable: String,
    /// Wall-clock timeout for one engine invocation, in seconds
    pub timeout_seconds: u64,
    /// Memory ceiling for the engine process, in megabytes
    pub max_memory_mb: u64,
    /// Number of parallel jobs passed to the engine
    pub jobs: u32,
    /// Directory holding custom rule files (.yml/.yaml)
    pub rules_dir: PathBuf,
    /// Registry rule-pack identifiers accepted in scan requests
    pub rule_packs: Vec<String>,
    /// Additional CLI arguments appended to every invocation
    pub extra_args: Vec<String>,
}

impl EngineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            executable: "semgrep".to_string(),
            timeout_seconds: 300,
            max_memory_mb: 4096,
            jobs: 4,
            rules_dir: PathBuf::from("rules/custom"),
            rule_packs: default_rule_packs(),
            extra_args: vec![],
        }
    }
}

fn default_rule_packs() -> Vec<String> {
    [
        "auto",
        "p/security-audit",
        "p/owasp-top-ten",
        "p/cwe-top-25",
        "p/python",
        "p/javascript",
        "p/typescript",
        "p/java",
        "p/go",
        "p/php",
        "p/ruby",
        "p/c",
        "p/cpp",
        "p/csharp",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Request size and concurrency limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum size of a single submitted file, in bytes
    pub max_file_bytes: u64,
    /// Maximum number of files accepted in one request
    pub max_files_per_request: usize,
    /// Maximum total content size of one request, in bytes
    pub max_request_bytes: u64,
    /// Maximum size of a single code snippet, in bytes
    pub max_snippet_bytes: u64,
    /// Number of engine invocations allowed to run simultaneously
    pub max_concurrent_scans: usize,
    /// How long a request may wait for an invocation permit before being
    /// rejected as overloaded, in milliseconds
    pub admission_timeout_ms: u64,
}

impl LimitsConfig {
    pub fn admission_timeout(&self) -> Duration {
        Duration::from_millis(self.admission_timeout_ms)
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 10 * 1024 * 1024,
            max_files_per_request: 50,
            max_request_bytes: 50 * 1024 * 1024,
            max_snippet_bytes: 1_000_000,
            max_concurrent_scans: 4,
            admission_timeout_ms: 500,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level filter (overridden by RUST_LOG)
    pub level: String,
    /// Output format: "pretty" or "json"
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.engine.validate()?;
        self.limits.validate()?;
        Ok(())
    }
}

impl Config {
    /// Load configuration from files and environment variables
    ///
    /// Sources, lowest priority first: `config/default`, `config/{ENV}`,
    /// `config/local`, then `SASTRA__*` environment variables.
    pub fn load() -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        if let Ok(env) = std::env::var("ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        builder = builder
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("SASTRA").separator("__"));

        let config: Config = builder.build()?.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(#[from] ValidationError),
}
