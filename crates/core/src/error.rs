// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds shared across the daemon and the client runtime.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors the daemon can report back to a connected client.
///
/// Every variant round-trips through the wire protocol as a
/// `Response::Error { kind, message }` frame; `kind()` gives the stable
/// string tag used on the wire so clients can match on it without parsing
/// the human-readable message.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("command failed: {message}")]
    CommandFailure { message: String, exit_code: Option<i32>, stderr: Option<String> },

    #[error("validation failed: {message}")]
    ValidationFailure { message: String },

    #[error("failed to parse command output: {message}")]
    ParseFailure { message: String },

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl DaemonError {
    /// Stable wire-level tag for this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            DaemonError::CommandFailure { .. } => "command_failure",
            DaemonError::ValidationFailure { .. } => "validation_failure",
            DaemonError::ParseFailure { .. } => "parse_failure",
            DaemonError::UnknownCommand(_) => "unknown_command",
            DaemonError::InternalError(_) => "internal_error",
        }
    }

    /// The wire response's `details` field: raw stderr for a failed
    /// command, absent for every other kind.
    pub fn details(&self) -> Option<String> {
        match self {
            DaemonError::CommandFailure { stderr, .. } => stderr.clone(),
            _ => None,
        }
    }
}

/// Errors surfaced to callers of the client runtime.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("communication error: {0}")]
    CommunicationError(String),

    #[error("protocol error: {0}")]
    ProtocolError(String),

    #[error("remote agent disconnected: {0}")]
    RemoteAgentDisconnected(String),

    #[error("TLS negotiation failed ({code}): {message}")]
    TlsNegotiationError { code: TlsErrorCode, message: String },

    #[error("authentication failed: {0}")]
    AuthError(String),

    #[error(
        "certificate mismatch for {host_key}: expected {expected}, received {received} \
         (possible MITM attack or certificate rotation)"
    )]
    CertificateMismatch { host_key: String, expected: String, received: String },

    #[error(transparent)]
    Daemon(#[from] DaemonError),
}

/// TLS handshake failure codes exchanged during the version/Hello negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TlsErrorCode {
    /// The server requires TLS but the client asked for a plaintext connection.
    #[serde(rename = "TLS_REQUIRED")]
    Required,
    /// The client asked for TLS but the server has no certificate configured.
    #[serde(rename = "TLS_UNAVAILABLE")]
    Unavailable,
    /// The two sides negotiated incompatible protocol versions.
    #[serde(rename = "PROTOCOL_MISMATCH")]
    ProtocolMismatch,
}

impl TlsErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TlsErrorCode::Required => "TLS_REQUIRED",
            TlsErrorCode::Unavailable => "TLS_UNAVAILABLE",
            TlsErrorCode::ProtocolMismatch => "PROTOCOL_MISMATCH",
        }
    }
}

impl std::fmt::Display for TlsErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
