// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution: spawn, feed optional stdin, enforce a timeout,
//! capture output, and (optionally) append an audit log entry.
//!
//! One reusable `run_with_timeout` entry point (`tokio::process::Command`,
//! piped stdio, `wait_with_output`, UTF-8-lossy decoding) backs every
//! `zfs`/`zpool` invocation instead of each caller hand-rolling its own
//! spawn/timeout/capture dance.

use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::audit::{truncate_for_audit, AuditEntry, AuditLogger};
use crate::env;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to spawn '{command}': {source}")]
    Spawn { command: String, #[source] source: std::io::Error },

    #[error("command '{command}' timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("failed to write to stdin of '{command}': {source}")]
    StdinWrite { command: String, #[source] source: std::io::Error },
}

/// A command to run, fully resolved (binary path as `argv[0]`).
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub argv: Vec<String>,
    pub stdin: Option<String>,
    pub timeout: Duration,
    pub log_enabled: bool,
    pub user_uid: i32,
}

impl CommandSpec {
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            argv,
            stdin: None,
            timeout: env::command_timeout(),
            log_enabled: false,
            user_uid: -1,
        }
    }

    pub fn with_stdin(mut self, stdin: impl Into<String>) -> Self {
        self.stdin = Some(stdin.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn for_audit(mut self, log_enabled: bool, user_uid: i32) -> Self {
        self.log_enabled = log_enabled;
        self.user_uid = user_uid;
        self
    }

    fn argv_display(&self) -> String {
        shlex::try_join(self.argv.iter().map(String::as_str)).unwrap_or_else(|_| self.argv.join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub return_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

/// Run `spec`, enforcing its timeout, and append an audit entry if
/// `spec.log_enabled` is set and `ZFDASH_DISABLE_AUDIT_LOG` is unset.
pub async fn run_with_timeout(spec: CommandSpec) -> Result<CommandOutput, RunnerError> {
    let argv_str = spec.argv_display();
    let program = spec.argv.first().cloned().unwrap_or_default();
    let start = Instant::now();
    let start_epoch_ms = zfdash_core::SystemClock.epoch_ms();

    let span = tracing::info_span!(
        "runner.exec",
        command = %argv_str,
        timeout_ms = spec.timeout.as_millis() as u64,
    );
    let _entered = span.enter();
    tracing::debug!("executing command");

    let result = run_inner(&spec, &argv_str, &program).await;

    let duration = start.elapsed();
    match &result {
        Ok(output) => {
            if output.return_code == 0 {
                tracing::debug!(return_code = output.return_code, duration_ms = duration.as_millis() as u64, "command finished");
            } else {
                tracing::warn!(return_code = output.return_code, stderr = %output.stderr.trim(), "command exited non-zero");
            }
        }
        Err(e) => tracing::error!(error = %e, "command execution failed"),
    }

    if spec.log_enabled && env::audit_log_enabled() {
        let (return_code, stdout, stderr) = match &result {
            Ok(o) => (o.return_code, o.stdout.as_str(), o.stderr.as_str()),
            Err(_) => (-1, "", ""),
        };
        let (_, stdout_truncated) = truncate_for_audit(stdout);
        let (_, stderr_truncated) = truncate_for_audit(stderr);
        let entry = AuditEntry {
            ts_ms: start_epoch_ms,
            argv: argv_str,
            stdin_present: spec.stdin.is_some(),
            return_code,
            duration_ms: duration.as_millis() as u64,
            stdout_truncated,
            stderr_truncated,
        };
        let logger = AuditLogger::for_uid(spec.user_uid);
        if let Err(e) = logger.append(&entry).await {
            tracing::warn!(error = %e, "failed to write audit log entry");
        }
    }

    result
}

async fn run_inner(
    spec: &CommandSpec,
    argv_str: &str,
    program: &str,
) -> Result<CommandOutput, RunnerError> {
    let mut cmd = Command::new(program);
    cmd.args(&spec.argv[1..]);
    // Ensures a timed-out child is reaped rather than orphaned: dropping the
    // `wait_with_output` future on timeout drops the `Child`, and
    // `kill_on_drop` makes that drop send SIGKILL.
    cmd.kill_on_drop(true);
    cmd.stdin(if spec.stdin.is_some() {
        std::process::Stdio::piped()
    } else {
        std::process::Stdio::null()
    });
    cmd.stdout(std::process::Stdio::piped());
    cmd.stderr(std::process::Stdio::piped());

    let mut child = cmd.spawn().map_err(|source| RunnerError::Spawn {
        command: argv_str.to_string(),
        source,
    })?;

    if let Some(data) = &spec.stdin {
        if let Some(mut stdin) = child.stdin.take() {
            let write_result = stdin.write_all(data.as_bytes()).await;
            drop(stdin);
            write_result.map_err(|source| RunnerError::StdinWrite {
                command: argv_str.to_string(),
                source,
            })?;
        }
    }

    let start = Instant::now();
    let wait = tokio::time::timeout(spec.timeout, child.wait_with_output()).await;

    let output = match wait {
        Ok(Ok(output)) => output,
        Ok(Err(source)) => {
            return Err(RunnerError::Spawn { command: argv_str.to_string(), source })
        }
        Err(_) => {
            return Err(RunnerError::Timeout { command: argv_str.to_string(), timeout: spec.timeout })
        }
    };

    Ok(CommandOutput {
        return_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        duration: start.elapsed(),
    })
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
