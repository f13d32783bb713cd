//! Sastra Core - Foundation crate for the Sastra scanning service
//!
//! This crate provides shared functionality used by the engine and HTTP
//! layers:
//!
//! # Modules
//!
//! - [`config`] — Strongly-typed configuration with TOML and environment variable support
//! - [`domain`] — Scan requests, findings, results, and the severity model
//! - [`logging`] — Structured logging with tracing
//!
//! # Configuration
//!
//! Load configuration from files and environment:
//!
//! ```rust,ignore
//! use sastra_core::Config;
//!
//! let config = Config::load()?;
//! ```
//!
//! Environment variables use the `SASTRA__` prefix with double underscore
//! separators:
//!
//! ```bash
//! SASTRA__SERVER__PORT=8000
//! SASTRA__ENGINE__TIMEOUT_SECONDS=300
//! ```

pub mod config;
pub mod domain;
pub mod logging;

pub use config::Config;
pub use logging::init_tracing;
