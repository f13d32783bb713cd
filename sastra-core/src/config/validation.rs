//! Configuration validation module

use crate::config::{EngineConfig, LimitsConfig, ServerConfig};

/// Trait for validating configuration sections
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Server configuration error: {message}")]
    Server { message: String },

    #[error("Engine configuration error: {message}")]
    Engine { message: String },

    #[error("Limits configuration error: {message}")]
    Limits { message: String },
}

impl ValidationError {
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
        }
    }

    pub fn limits(message: impl Into<String>) -> Self {
        Self::Limits {
            message: message.into(),
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::server("Port must be in range 1-65535"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(ValidationError::server("Request timeout must be > 0"));
        }
        if let Some(key) = &self.api_key {
            if key.len() < 16 {
                return Err(ValidationError::server(
                    "API key must be at least 16 characters",
                ));
            }
        }
        Ok(())
    }
}

impl Validate for EngineConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.executable.trim().is_empty() {
            return Err(ValidationError::engine("Executable path must not be empty"));
        }
        if self.timeout_seconds == 0 {
            return Err(ValidationError::engine("Engine timeout must be > 0"));
        }
        if self.max_memory_mb < 128 {
            return Err(ValidationError::engine(format!(
                "Memory ceiling must be at least 128 MB, got {}",
                self.max_memory_mb
            )));
        }
        if self.jobs == 0 {
            return Err(ValidationError::engine("Engine jobs must be > 0"));
        }
        if self.rule_packs.is_empty() {
            return Err(ValidationError::engine(
                "At least one rule pack must be configured",
            ));
        }
        Ok(())
    }
}

impl Validate for LimitsConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.max_file_bytes == 0 {
            return Err(ValidationError::limits("Max file size must be > 0"));
        }
        if self.max_files_per_request == 0 {
            return Err(ValidationError::limits("Max files per request must be > 0"));
        }
        if self.max_request_bytes < self.max_file_bytes {
            return Err(ValidationError::limits(
                "Max request size must be at least the max file size",
            ));
        }
        if self.max_snippet_bytes == 0 || self.max_snippet_bytes > self.max_file_bytes {
            return Err(ValidationError::limits(
                "Max snippet size must be > 0 and no larger than the max file size",
            ));
        }
        if self.max_concurrent_scans == 0 {
            return Err(ValidationError::limits("Max concurrent scans must be > 0"));
        }
        if self.admission_timeout_ms == 0 {
            return Err(ValidationError::limits("Admission timeout must be > 0"));
        }
        Ok(())
    }
}
