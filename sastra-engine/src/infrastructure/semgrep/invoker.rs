//! Semgrep subprocess invoker
//!
//! Spawns the engine against a workspace with structured JSON output on
//! stdout and diagnostics on stderr. Enforcement:
//!
//! - wall-clock timeout via [`tokio::time::timeout`]; on expiry the whole
//!   process group is killed so no descendant survives the request
//! - memory ceiling via the engine's own `--max-memory` flag, backed on
//!   Unix by an `RLIMIT_AS` cap applied between fork and exec
//! - `kill_on_drop` ties the subprocess to the invocation future, so a
//!   cancelled or disconnected request terminates the engine implicitly

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

use sastra_core::config::EngineConfig;

use crate::domain::errors::ScanError;
use crate::domain::invocation::{EngineOutcome, RuleConfig};
use crate::domain::traits::EngineInvoker;

/// How long a `--version` probe may take before the engine is considered
/// unavailable.
const VERSION_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Production engine invoker backed by the semgrep CLI
pub struct SemgrepInvoker {
    config: EngineConfig,
}

impl SemgrepInvoker {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Arguments for one scan invocation, in the order they are passed
    fn build_args(&self, workspace: &Path, rules: &RuleConfig) -> Vec<String> {
        let mut args = vec![
            "scan".to_string(),
            "--json".to_string(),
            "--config".to_string(),
            rules.as_engine_arg(),
            "--timeout".to_string(),
            self.config.timeout_seconds.to_string(),
            "--max-memory".to_string(),
            self.config.max_memory_mb.to_string(),
            "--jobs".to_string(),
            self.config.jobs.to_string(),
            "--time".to_string(),
            "--no-git-ignore".to_string(),
            "--metrics=off".to_string(),
            "--disable-version-check".to_string(),
        ];
        args.extend(self.config.extra_args.iter().cloned());
        args.push(workspace.display().to_string());
        args
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.config.executable);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        apply_unix_limits(&mut cmd, self.config.max_memory_mb);

        cmd
    }
}

#[async_trait]
impl EngineInvoker for SemgrepInvoker {
    #[instrument(skip(self, rules), fields(workspace = %workspace.display(), config = %rules.as_engine_arg()))]
    async fn invoke(
        &self,
        workspace: &Path,
        rules: &RuleConfig,
    ) -> Result<EngineOutcome, ScanError> {
        let args = self.build_args(workspace, rules);
        debug!(executable = %self.config.executable, ?args, "Invoking engine");

        let cmd = self.command(&args);
        run_bounded(cmd, self.config.timeout()).await
    }

    async fn version(&self) -> Result<String, ScanError> {
        let mut cmd = Command::new(&self.config.executable);
        cmd.arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let outcome = run_bounded(cmd, VERSION_PROBE_TIMEOUT).await?;
        match outcome {
            EngineOutcome::Completed {
                exit_code: Some(0),
                stdout,
                ..
            } => {
                let version = String::from_utf8_lossy(&stdout).trim().to_string();
                if version.is_empty() {
                    return Err(ScanError::EngineError {
                        exit_code: Some(0),
                        detail: "Engine reported an empty version".into(),
                    });
                }
                debug!(version = %version, "Engine found");
                Ok(version)
            }
            EngineOutcome::Completed {
                exit_code, stderr, ..
            } => Err(ScanError::EngineError {
                exit_code,
                detail: String::from_utf8_lossy(&stderr).trim().to_string(),
            }),
            EngineOutcome::TimedOut { elapsed } => Err(ScanError::EngineTimeout { elapsed }),
            EngineOutcome::SpawnFailed { message } => Err(ScanError::EngineError {
                exit_code: None,
                detail: message,
            }),
        }
    }
}

/// Run a prepared command to completion or kill it at the deadline.
///
/// A spawn failure is a terminal outcome, not an `Err`: the orchestrator
/// decides how to surface it.
async fn run_bounded(mut cmd: Command, limit: Duration) -> Result<EngineOutcome, ScanError> {
    let started = Instant::now();

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            return Ok(EngineOutcome::SpawnFailed {
                message: e.to_string(),
            });
        }
    };
    let pid = child.id();

    match tokio::time::timeout(limit, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(EngineOutcome::Completed {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        }),
        Ok(Err(e)) => Err(ScanError::Internal(format!(
            "Failed to collect engine output: {e}"
        ))),
        Err(_elapsed) => {
            // Dropping the wait future killed the direct child via
            // kill_on_drop; sweep the rest of its process group.
            #[cfg(unix)]
            if let Some(pid) = pid {
                kill_process_group(pid);
            }
            #[cfg(not(unix))]
            let _ = pid;

            Ok(EngineOutcome::TimedOut {
                elapsed: started.elapsed(),
            })
        }
    }
}

#[cfg(unix)]
fn apply_unix_limits(cmd: &mut Command, max_memory_mb: u64) {
    use nix::sys::resource::{Resource, setrlimit};

    let ceiling = max_memory_mb.saturating_mul(1024 * 1024);

    // Runs between fork and exec in the child.
    unsafe {
        cmd.pre_exec(move || {
            // Own process group, so a timeout can kill every descendant.
            nix::unistd::setsid().map_err(std::io::Error::from)?;
            setrlimit(Resource::RLIMIT_AS, ceiling, ceiling).map_err(std::io::Error::from)?;
            Ok(())
        });
    }
}

#[cfg(unix)]
fn kill_process_group(pid: u32) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    // After setsid the child's pgid equals its pid. ESRCH means the group
    // is already gone.
    if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        if e != nix::errno::Errno::ESRCH {
            tracing::warn!(pid, error = %e, "Failed to kill engine process group");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn invoker() -> SemgrepInvoker {
        SemgrepInvoker::new(EngineConfig {
            timeout_seconds: 7,
            max_memory_mb: 2048,
            jobs: 2,
            extra_args: vec!["--verbose".to_string()],
            ..Default::default()
        })
    }

    #[test]
    fn args_carry_limits_and_target() {
        let args = invoker().build_args(
            Path::new("/tmp/scan-abc"),
            &RuleConfig::Registry("p/python".into()),
        );

        let joined = args.join(" ");
        assert!(joined.starts_with("scan --json --config p/python"));
        assert!(joined.contains("--timeout 7"));
        assert!(joined.contains("--max-memory 2048"));
        assert!(joined.contains("--jobs 2"));
        assert!(joined.contains("--metrics=off"));
        assert!(joined.contains("--verbose"));
        assert_eq!(args.last().unwrap(), "/tmp/scan-abc");
    }

    #[test]
    fn args_accept_rule_file_config() {
        let args = invoker().build_args(
            Path::new("/tmp/scan-abc"),
            &RuleConfig::File(PathBuf::from("rules/custom/essentials.yml")),
        );
        let config_pos = args.iter().position(|a| a == "--config").unwrap();
        assert_eq!(args[config_pos + 1], "rules/custom/essentials.yml");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_bounded_completes_fast_commands() {
        let mut cmd = Command::new("echo");
        cmd.arg("ok")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match run_bounded(cmd, Duration::from_secs(5)).await.unwrap() {
            EngineOutcome::Completed {
                exit_code, stdout, ..
            } => {
                assert_eq!(exit_code, Some(0));
                assert_eq!(String::from_utf8_lossy(&stdout).trim(), "ok");
            }
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_bounded_kills_at_deadline() {
        let mut cmd = Command::new("sleep");
        cmd.arg("30")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let started = Instant::now();
        let outcome = run_bounded(cmd, Duration::from_millis(200)).await.unwrap();

        assert!(matches!(outcome, EngineOutcome::TimedOut { .. }));
        assert!(
            started.elapsed() < Duration::from_secs(2),
            "timeout enforcement took {:?}",
            started.elapsed()
        );
    }

    #[tokio::test]
    async fn run_bounded_reports_spawn_failure() {
        let mut cmd = Command::new("/definitely/not/a/real/binary");
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        match run_bounded(cmd, Duration::from_secs(1)).await.unwrap() {
            EngineOutcome::SpawnFailed { message } => assert!(!message.is_empty()),
            other => panic!("expected spawn failure, got {other:?}"),
        }
    }
}
