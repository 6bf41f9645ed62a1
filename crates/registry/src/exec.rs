// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared plumbing every handler in [`crate::commands`] goes through:
//! resolve the binary, run it with the request's audit metadata, and
//! classify the outcome against the [`crate::outcome`] benign-stderr table.

use zfdash_runner::{discover_binary, run_with_timeout, CommandOutput, CommandSpec};

use crate::error::RegistryError;
use crate::outcome::is_benign;

/// Per-request metadata threaded through to the runner for audit logging:
/// whether this command should be audit-logged at all, and which
/// connected user issued it.
#[derive(Debug, Clone, Copy)]
pub struct ExecCtx {
    pub log_enabled: bool,
    pub user_uid: i32,
}

impl ExecCtx {
    pub fn new(log_enabled: bool, user_uid: i32) -> Self {
        Self { log_enabled, user_uid }
    }
}

/// Resolve `bin_name` (`"zfs"` or `"zpool"`) and run it with `args` appended,
/// returning the raw output without interpreting return code or stderr —
/// callers apply their own success/benign/error rules.
pub async fn run(bin_name: &str, args: Vec<String>, ctx: ExecCtx) -> Result<CommandOutput, RegistryError> {
    let bin = discover_binary(bin_name)?;
    let mut argv = vec![bin.to_string_lossy().into_owned()];
    argv.extend(args);
    let spec = CommandSpec::new(argv).for_audit(ctx.log_enabled, ctx.user_uid);
    Ok(run_with_timeout(spec).await?)
}

/// Same as [`run`], but feeds `stdin_data` (e.g. a passphrase) to the child.
pub async fn run_with_stdin(
    bin_name: &str,
    args: Vec<String>,
    stdin_data: &str,
    ctx: ExecCtx,
) -> Result<CommandOutput, RegistryError> {
    let bin = discover_binary(bin_name)?;
    let mut argv = vec![bin.to_string_lossy().into_owned()];
    argv.extend(args);
    let spec = CommandSpec::new(argv).with_stdin(stdin_data).for_audit(ctx.log_enabled, ctx.user_uid);
    Ok(run_with_timeout(spec).await?)
}

/// Require success or raise a [`RegistryError::Command`] carrying the
/// failure context (`CommandError`).
pub fn require_success(output: &CommandOutput, argv: &[String], message: impl Into<String>) -> Result<(), RegistryError> {
    if output.return_code != 0 {
        return Err(RegistryError::command(message, argv, output.stderr.clone(), output.return_code));
    }
    Ok(())
}

/// Require success unless stderr matches `benign_command`'s entry in the
/// benign-stderr table, in which case the non-zero exit is swallowed
///.
pub fn require_success_or_benign(
    output: &CommandOutput,
    argv: &[String],
    benign_command: &str,
    message: impl Into<String>,
) -> Result<bool, RegistryError> {
    if output.return_code == 0 {
        return Ok(false);
    }
    if is_benign(benign_command, &output.stderr) {
        return Ok(true);
    }
    Err(RegistryError::command(message, argv, output.stderr.clone(), output.return_code))
}
