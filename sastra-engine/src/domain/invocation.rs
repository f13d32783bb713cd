//! Engine invocation inputs and terminal outcomes

use std::path::PathBuf;
use std::time::Duration;

/// A resolved rule-set reference, ready to hand to the engine.
///
/// Resolution (pack-name lookup, file existence) happens in the rule
/// catalog before an invocation is admitted; an unresolved reference never
/// reaches the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleConfig {
    /// A registry pack identifier such as `auto` or `p/security-audit`
    Registry(String),
    /// A catalogued custom rule file
    File(PathBuf),
}

impl RuleConfig {
    /// Value passed to the engine's `--config` flag
    pub fn as_engine_arg(&self) -> String {
        match self {
            RuleConfig::Registry(name) => name.clone(),
            RuleConfig::File(path) => path.display().to_string(),
        }
    }
}

/// Terminal outcome of one engine subprocess run
#[derive(Debug)]
pub enum EngineOutcome {
    /// The process ran to completion (any exit code)
    Completed {
        exit_code: Option<i32>,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },
    /// The process exceeded the wall-clock deadline and was killed
    TimedOut { elapsed: Duration },
    /// The process could not be started at all
    SpawnFailed { message: String },
}
