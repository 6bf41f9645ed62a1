// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the command registry: a command-execution failure and
//! an output-parsing failure, the two daemon-internal error classes this
//! crate's handlers raise.

use thiserror::Error;

/// Raised by a registry handler. Carries enough context (`argv`, `stderr`,
/// `return_code`) for the daemon to shape a `{status:"error", error,
/// details:stderr}` response without re-deriving it.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{message}")]
    Command {
        message: String,
        argv: Vec<String>,
        stderr: String,
        return_code: i32,
    },

    /// A vdev spec (or other request shape) failed validation before any
    /// subprocess was launched.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("required binary not available: {0}")]
    BinaryNotFound(#[from] zfdash_runner::BinaryDiscoveryError),

    #[error(transparent)]
    Runner(#[from] zfdash_runner::RunnerError),

    #[error("failed to parse '{tool}' output: {message}")]
    Parse { tool: String, message: String },
}

impl RegistryError {
    pub fn command(message: impl Into<String>, argv: &[String], stderr: impl Into<String>, return_code: i32) -> Self {
        RegistryError::Command {
            message: message.into(),
            argv: argv.to_vec(),
            stderr: stderr.into(),
            return_code,
        }
    }
}

/// Flattens a registry-level failure into the wire-facing error kind the
/// daemon dispatcher responds with.
impl From<RegistryError> for zfdash_core::DaemonError {
    fn from(err: RegistryError) -> Self {
        use zfdash_core::DaemonError;
        match err {
            RegistryError::Command { message, stderr, return_code, .. } => {
                DaemonError::CommandFailure { message, exit_code: Some(return_code), stderr: Some(stderr) }
            }
            RegistryError::Validation(message) => DaemonError::ValidationFailure { message },
            RegistryError::Parse { tool, message } => {
                DaemonError::ParseFailure { message: format!("'{tool}': {message}") }
            }
            RegistryError::BinaryNotFound(e) => DaemonError::InternalError(e.to_string()),
            RegistryError::Runner(e) => DaemonError::InternalError(e.to_string()),
        }
    }
}
