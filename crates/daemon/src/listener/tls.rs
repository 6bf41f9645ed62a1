// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TLS-TCP agent transport: version hello, optional TLS upgrade,
//! authentication handshake, all run to completion before a
//! [`crate::connection::Connection`] is handed to the dispatcher.
//!
//! Agent mode accepts one connection at a time — the same discipline
//! pipe/UDS use — so this listener's `accept` loop never spawns a second
//! in-flight handshake concurrently with an active command session.

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;
use tracing::{info, warn};

use zfdash_core::credential::CredentialEntry;
use zfdash_core::error::TlsErrorCode;
use zfdash_wire::{
    decode_line, encode_line, read_line, write_line, AuthErrorCode, AuthOutcome, AuthResponse,
    HelloAction, ProtocolError, VersionHello, PROTOCOL_VERSION,
};

use crate::auth::{generate_challenge, verify_response};
use crate::connection::{split_boxed, Connection};
use crate::credential_store::CredentialStore;
use crate::env::{AUTH_TIMEOUT, HELLO_TIMEOUT};

#[derive(Debug, Error)]
pub enum AgentListenError {
    #[error("failed to bind port {port}: {source}")]
    Bind { port: u16, #[source] source: std::io::Error },
}

#[derive(Debug, Error)]
pub enum HandshakeOutcome {
    #[error("client closed connection during handshake")]
    ClosedEarly,
    #[error("protocol error during handshake: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("client failed authentication")]
    AuthFailed,
}

pub struct AgentListener {
    inner: TcpListener,
    tls_acceptor: Option<TlsAcceptor>,
    credentials: Arc<CredentialStore>,
}

impl AgentListener {
    pub async fn bind(port: u16, tls_acceptor: Option<TlsAcceptor>, credentials: Arc<CredentialStore>) -> Result<Self, AgentListenError> {
        let addr: SocketAddr = ([0, 0, 0, 0], port).into();
        let inner = TcpListener::bind(addr).await.map_err(|source| AgentListenError::Bind { port, source })?;
        info!(port, tls = tls_acceptor.is_some(), "daemon listening for agent connections");
        Ok(Self { inner, tls_acceptor, credentials })
    }

    /// Accept and fully handshake the next client, retrying on any client
    /// that fails its handshake (malformed hello, wrong password, etc.) so
    /// a single hostile or buggy peer can't wedge the listener.
    pub async fn accept(&self) -> Result<Connection, std::io::Error> {
        loop {
            let (stream, peer) = self.inner.accept().await?;
            match self.handshake(stream).await {
                Ok(conn) => return Ok(conn),
                Err(e) => warn!(%peer, error = %e, "agent handshake failed, awaiting next connection"),
            }
        }
    }

    async fn handshake(&self, mut stream: TcpStream) -> Result<Connection, HandshakeOutcome> {
        let want_tls = read_version_hello(&mut stream).await?;

        if want_tls && self.tls_acceptor.is_none() {
            reply_hello_error(&mut stream, TlsErrorCode::Unavailable).await?;
            return Err(HandshakeOutcome::ClosedEarly);
        }
        if !want_tls && self.tls_acceptor.is_some() {
            reply_hello_error(&mut stream, TlsErrorCode::Required).await?;
            return Err(HandshakeOutcome::ClosedEarly);
        }

        if let Some(acceptor) = &self.tls_acceptor {
            let line = encode_line(&HelloAction::tls_accept())?;
            write_line(&mut stream, &line).await?;

            let tls_stream = acceptor.accept(stream).await.map_err(|_| HandshakeOutcome::ClosedEarly)?;
            let mut tls_stream = tls_stream;
            self.authenticate(&mut tls_stream).await?;
            let (reader, writer) = split_boxed(tls_stream);
            Ok(Connection::new(reader, writer))
        } else {
            let line = encode_line(&HelloAction::plain_accept())?;
            write_line(&mut stream, &line).await?;

            let mut stream = stream;
            self.authenticate(&mut stream).await?;
            let (reader, writer) = split_boxed(stream);
            Ok(Connection::new(reader, writer))
        }
    }

    /// Run the post-transport authentication handshake (steps
    /// 1-4) over an already TLS-wrapped (or, for a `--no-tls` agent,
    /// plaintext) stream.
    async fn authenticate<S>(&self, stream: &mut S) -> Result<(), HandshakeOutcome>
    where
        S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
    {
        let (challenge, nonce) = generate_challenge();
        let line = encode_line(&challenge)?;
        write_line(stream, &line).await?;

        let mut reader = tokio::io::BufReader::new(&mut *stream);
        let line = tokio::time::timeout(AUTH_TIMEOUT, read_line(&mut reader))
            .await
            .map_err(|_| HandshakeOutcome::AuthFailed)??
            .ok_or(HandshakeOutcome::ClosedEarly)?;

        let response: AuthResponse = match decode_line(&line) {
            Ok(r) => r,
            Err(_) => {
                let outcome = AuthOutcome::error(AuthErrorCode::Malformed);
                let _ = write_line(stream, &encode_line(&outcome)?).await;
                return Err(HandshakeOutcome::AuthFailed);
            }
        };

        if self.verify_any_credential(&nonce, &response.response).await {
            write_line(stream, &encode_line(&AuthOutcome::ok())?).await?;
            Ok(())
        } else {
            let _ = write_line(stream, &encode_line(&AuthOutcome::error(AuthErrorCode::AuthFailed))?).await;
            Err(HandshakeOutcome::AuthFailed)
        }
    }

    /// There is no username frame on the wire; the daemon
    /// accepts a response that verifies against any stored credential, in
    /// practice the single seeded admin account.
    async fn verify_any_credential(&self, nonce: &[u8], response_hex: &str) -> bool {
        let Ok(entries) = self.credentials.load().await else { return false };
        entries.values().any(|entry: &CredentialEntry| verify_response(entry, nonce, response_hex).unwrap_or(false))
    }
}

async fn read_version_hello(stream: &mut TcpStream) -> Result<bool, HandshakeOutcome> {
    let mut reader = tokio::io::BufReader::new(&mut *stream);
    let line = tokio::time::timeout(HELLO_TIMEOUT, read_line(&mut reader))
        .await
        .map_err(|_| HandshakeOutcome::ClosedEarly)??
        .ok_or(HandshakeOutcome::ClosedEarly)?;

    let hello: VersionHello = decode_line(&line)?;
    if hello.v != PROTOCOL_VERSION {
        reply_hello_error(stream, TlsErrorCode::ProtocolMismatch).await?;
        return Err(HandshakeOutcome::ClosedEarly);
    }
    Ok(hello.tls)
}

async fn reply_hello_error(stream: &mut TcpStream, code: TlsErrorCode) -> Result<(), ProtocolError> {
    let line = encode_line(&HelloAction::error(code))?;
    write_line(stream, &line).await
}
