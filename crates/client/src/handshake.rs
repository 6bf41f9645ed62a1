// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client-side steps of the TLS-TCP agent handshake: the
//! plaintext version hello, and the post-TLS authentication
//! challenge/response. Certificate pinning itself lives in
//! [`crate::trust_store`]; this module only computes the wire frames.

use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

use zfdash_core::credential::{AUTH_HANDSHAKE_ITERATIONS, AUTH_HANDSHAKE_SALT};
use zfdash_core::error::TlsErrorCode;
use zfdash_wire::{
    decode_line, encode_line, read_line, write_line, AuthChallenge, AuthOutcome, AuthResponse,
    AuthStatus, HelloAction, ProtocolError, Ready, VersionHello, PROTOCOL_VERSION,
};

use crate::env::{AUTH_RESPONSE_TIMEOUT, HELLO_TIMEOUT, READY_TIMEOUT};
use crate::ClientError;

type HmacSha256 = Hmac<Sha256>;

/// Derive the PBKDF2-HMAC-SHA256 auth handshake key from a plaintext
/// password, then HMAC the server's nonce with it.
///
/// Duplicated from `zfdash-daemon::auth::compute_response` rather than
/// depending on that crate: the daemon crate is root-privileged code (it
/// owns the credential store on disk) and must not be linked into an
/// unprivileged client binary. Both sides derive from the same compiled-in
/// [`AUTH_HANDSHAKE_SALT`]/[`AUTH_HANDSHAKE_ITERATIONS`] constants in
/// `zfdash-core`, so the two independent implementations stay byte-exact.
pub fn compute_auth_response(password: &str, nonce: &[u8]) -> Result<String, ClientError> {
    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), AUTH_HANDSHAKE_SALT, AUTH_HANDSHAKE_ITERATIONS, &mut key);
    let mut mac = HmacSha256::new_from_slice(&key)
        .map_err(|e| ClientError::AuthError(format!("invalid derived key: {e}")))?;
    mac.update(nonce);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Send the plaintext version hello and interpret the server's reply.
/// Returns `true` if the server accepted a TLS upgrade, `false` if it
/// accepted plaintext.
pub async fn run_version_hello<S>(stream: &mut S, want_tls: bool) -> Result<bool, ClientError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let hello = VersionHello::new(want_tls);
    let line = encode_line(&hello).map_err(protocol_err)?;
    write_line(stream, &line).await.map_err(io_err)?;

    let mut reader = BufReader::new(&mut *stream);
    let line = tokio::time::timeout(HELLO_TIMEOUT, read_line(&mut reader))
        .await
        .map_err(|_| ClientError::Timeout(HELLO_TIMEOUT))?
        .map_err(io_err)?
        .ok_or_else(|| ClientError::CommunicationError("connection closed during version hello".into()))?;

    let action: HelloAction = decode_line(&line).map_err(protocol_err)?;
    match action {
        HelloAction::TlsAccept { v } => {
            check_version(v)?;
            Ok(true)
        }
        HelloAction::PlainAccept { v } => {
            check_version(v)?;
            Ok(false)
        }
        HelloAction::Error { v: _, code } => Err(ClientError::TlsNegotiationError {
            code,
            message: format!("server rejected version hello: {code}"),
        }),
    }
}

fn check_version(server_v: u8) -> Result<(), ClientError> {
    if server_v != PROTOCOL_VERSION {
        return Err(ClientError::TlsNegotiationError {
            code: TlsErrorCode::ProtocolMismatch,
            message: format!("server protocol v{server_v}, client v{PROTOCOL_VERSION}"),
        });
    }
    Ok(())
}

/// Run the post-TLS authentication handshake over
/// an already-established stream (plaintext UDS/pipe transports skip
/// this; only TLS-TCP agent connections call it).
pub async fn run_auth_handshake<S>(stream: &mut S, password: &str) -> Result<(), ClientError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(&mut *stream);
    let line = tokio::time::timeout(AUTH_RESPONSE_TIMEOUT, read_line(&mut reader))
        .await
        .map_err(|_| ClientError::Timeout(AUTH_RESPONSE_TIMEOUT))?
        .map_err(io_err)?
        .ok_or_else(|| ClientError::CommunicationError("connection closed during auth challenge".into()))?;
    let challenge: AuthChallenge = decode_line(&line).map_err(protocol_err)?;

    let nonce = hex::decode(&challenge.nonce)
        .map_err(|e| ClientError::AuthError(format!("malformed nonce: {e}")))?;
    let response = compute_auth_response(password, &nonce)?;

    let line = encode_line(&AuthResponse { response }).map_err(protocol_err)?;
    write_line(stream, &line).await.map_err(io_err)?;

    let mut reader = BufReader::new(&mut *stream);
    let line = tokio::time::timeout(AUTH_RESPONSE_TIMEOUT, read_line(&mut reader))
        .await
        .map_err(|_| ClientError::Timeout(AUTH_RESPONSE_TIMEOUT))?
        .map_err(io_err)?
        .ok_or_else(|| ClientError::CommunicationError("connection closed during auth outcome".into()))?;
    let outcome: AuthOutcome = decode_line(&line).map_err(protocol_err)?;

    match outcome.status {
        AuthStatus::Ok => Ok(()),
        AuthStatus::Error => {
            let code = outcome.code.map(|c| format!("{c:?}")).unwrap_or_else(|| "unknown".to_string());
            Err(ClientError::AuthError(code))
        }
    }
}

/// Wait for the daemon's `{"ready": true}` line before allowing requests
/// ("Ready signal").
pub async fn wait_for_ready<S>(stream: &mut S) -> Result<(), ClientError>
where
    S: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let line = tokio::time::timeout(READY_TIMEOUT, read_line(&mut reader))
        .await
        .map_err(|_| ClientError::Timeout(READY_TIMEOUT))?
        .map_err(io_err)?
        .ok_or_else(|| ClientError::CommunicationError("connection closed before ready signal".into()))?;
    let ready: Ready = decode_line(&line).map_err(protocol_err)?;
    if !ready.ready {
        return Err(ClientError::ProtocolError("daemon reported not-ready".into()));
    }
    Ok(())
}

fn io_err(e: ProtocolError) -> ClientError {
    match e {
        ProtocolError::ConnectionClosed => ClientError::CommunicationError("connection closed".into()),
        ProtocolError::Timeout => ClientError::Timeout(HELLO_TIMEOUT),
        other => ClientError::CommunicationError(other.to_string()),
    }
}

fn protocol_err(e: ProtocolError) -> ClientError {
    ClientError::ProtocolError(e.to_string())
}

#[cfg(test)]
#[path = "handshake_tests.rs"]
mod tests;
