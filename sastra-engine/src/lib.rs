//! Sastra Engine - Scan orchestration core
//!
//! This crate turns a validated scan request into a bounded, isolated
//! invocation of the external scanning engine and normalizes its output:
//!
//! - [`infrastructure::workspace`] — ephemeral per-request filesystem areas
//! - [`infrastructure::semgrep`] — subprocess invocation and output parsing
//! - [`infrastructure::catalog`] — rule pack and custom rule file catalog
//! - [`application::guard`] — bounded admission of concurrent invocations
//! - [`application::orchestrator`] — the single entry point composing the above
//!
//! The engine is reached only through the [`domain::traits::EngineInvoker`]
//! trait, so the orchestration core can be exercised with a fake invoker
//! that returns canned outcomes without spawning processes.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::guard::{ConcurrencyGuard, ScanPermit};
pub use application::orchestrator::ScanOrchestrator;
pub use domain::errors::ScanError;
pub use domain::invocation::{EngineOutcome, RuleConfig};
pub use domain::traits::EngineInvoker;
pub use infrastructure::catalog::{RuleCatalog, RuleListing};
pub use infrastructure::semgrep::SemgrepInvoker;
pub use infrastructure::workspace::{Workspace, WorkspaceManager};
