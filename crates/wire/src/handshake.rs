// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pre-request-loop handshake frames for the TLS-TCP agent transport:
//! version hello, TLS negotiation, authentication challenge/response, and
//! the `ready` signal every transport sends once it can accept commands.

use serde::{Deserialize, Serialize};

pub use zfdash_core::error::TlsErrorCode;

/// Bumped only on a wire-incompatible change.
pub const PROTOCOL_VERSION: u8 = 2;

/// Client's opening line: declares its desired protocol version and
/// whether it wants TLS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionHello {
    pub v: u8,
    pub tls: bool,
}

impl VersionHello {
    pub fn new(tls: bool) -> Self {
        Self { v: PROTOCOL_VERSION, tls }
    }
}

/// Server's reply to `VersionHello`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HelloAction {
    TlsAccept { v: u8 },
    PlainAccept { v: u8 },
    Error { v: u8, code: TlsErrorCode },
}

impl HelloAction {
    pub fn tls_accept() -> Self {
        HelloAction::TlsAccept { v: PROTOCOL_VERSION }
    }
    pub fn plain_accept() -> Self {
        HelloAction::PlainAccept { v: PROTOCOL_VERSION }
    }
    pub fn error(code: TlsErrorCode) -> Self {
        HelloAction::Error { v: PROTOCOL_VERSION, code }
    }
}

/// Server's authentication challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthChallenge {
    /// Hex-encoded random nonce, 32 bytes.
    pub nonce: String,
    /// Seconds the client has to answer.
    pub timeout: u64,
}

/// Client's HMAC response to the nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Hex-encoded `HMAC-SHA256(pbkdf2_key, nonce_bytes)`.
    pub response: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthErrorCode {
    AuthFailed,
    Timeout,
    Malformed,
}

/// Server's verdict on the authentication handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthOutcome {
    pub status: AuthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<AuthErrorCode>,
}

impl AuthOutcome {
    pub fn ok() -> Self {
        Self { status: AuthStatus::Ok, code: None }
    }
    pub fn error(code: AuthErrorCode) -> Self {
        Self { status: AuthStatus::Error, code: Some(code) }
    }
}

/// Sent by the daemon once it is prepared to accept requests, on every
/// transport ("Ready signal").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ready {
    pub ready: bool,
}

impl Default for Ready {
    fn default() -> Self {
        Self { ready: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_action_tags_serialize_screaming_snake() {
        let json = serde_json::to_string(&HelloAction::error(TlsErrorCode::Required)).unwrap();
        assert!(json.contains("\"action\":\"ERROR\""));
        assert!(json.contains("\"code\":\"TLS_REQUIRED\""));
    }

    #[test]
    fn ready_round_trips() {
        let r = Ready::default();
        let json = serde_json::to_string(&r).unwrap();
        let back: Ready = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }
}
