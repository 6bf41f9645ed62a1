// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TLS-TCP agent transport: plaintext version
//! hello, optional TLS upgrade with Trust-On-First-Use pinning (not real
//! chain-of-trust validation — the server's certificate is always
//! self-signed), then the authentication handshake, then the ready
//! signal.
//!
//! The certificate verifier is written directly against the `rustls`
//! 0.23 dangerous-configuration API (`ClientConfig::builder().dangerous()`,
//! the `verify_tls12_signature`/`verify_tls13_signature` free functions):
//! TOFU pinning means the usual chain-of-trust verifier never applies
//! here, so this accepts any presented certificate and leaves fingerprint
//! comparison to the pinning store.

use std::path::Path;
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, Error as TlsError, SignatureScheme};
use sha2::{Digest, Sha256};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use crate::handshake::{run_auth_handshake, run_version_hello, wait_for_ready};
use crate::trust_store;
use crate::ClientError;

use super::{split_boxed, Connection};

/// A [`ServerCertVerifier`] that accepts any certificate chain, deferring
/// the actual trust decision to [`crate::trust_store`]'s TOFU fingerprint
/// check after the handshake completes. Signatures are still verified
/// against the presented leaf certificate's public key — only the chain
/// of trust is skipped.
#[derive(Debug)]
struct TofuVerifier {
    provider: Arc<CryptoProvider>,
}

impl TofuVerifier {
    fn new() -> Self {
        Self { provider: Arc::new(rustls::crypto::ring::default_provider()) }
    }
}

impl ServerCertVerifier for TofuVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, TlsError> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        verify_tls12_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        verify_tls13_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider.signature_verification_algorithms.supported_schemes()
    }
}

fn tofu_client_config() -> ClientConfig {
    ClientConfig::builder()
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(TofuVerifier::new()))
        .with_no_client_auth()
}

/// Connect to a remote agent at `host:port`. Runs the version hello; if
/// both sides agree on TLS, upgrades the connection, verifies the peer
/// certificate against the TOFU store at `config_dir`, then runs the
/// authentication handshake. Always waits for the ready signal before
/// returning.
pub async fn connect(
    host: &str,
    port: u16,
    want_tls: bool,
    password: &str,
    config_dir: &Path,
) -> Result<Connection, ClientError> {
    let mut tcp = TcpStream::connect((host, port))
        .await
        .map_err(|e| ClientError::CommunicationError(format!("failed to connect to {host}:{port}: {e}")))?;

    let tls_negotiated = run_version_hello(&mut tcp, want_tls).await?;

    if !tls_negotiated {
        run_auth_handshake(&mut tcp, password).await?;
        let mut tcp = tcp;
        wait_for_ready(&mut tcp).await?;
        let (reader, writer) = split_boxed(tcp);
        return Ok(Connection { reader, writer, owns_daemon: false, tls_active: false, child: None });
    }

    let connector = TlsConnector::from(Arc::new(tofu_client_config()));
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|e| ClientError::TlsNegotiationError {
            code: zfdash_core::error::TlsErrorCode::ProtocolMismatch,
            message: format!("invalid server name '{host}': {e}"),
        })?;

    let mut tls_stream = connector
        .connect(server_name, tcp)
        .await
        .map_err(|e| ClientError::CommunicationError(format!("TLS handshake failed: {e}")))?;

    let peer_cert = tls_stream
        .get_ref()
        .1
        .peer_certificates()
        .and_then(|certs| certs.first())
        .cloned()
        .ok_or_else(|| ClientError::CommunicationError("server presented no certificate".into()))?;
    let fingerprint = hex::encode(Sha256::digest(peer_cert.as_ref()));

    trust_store::verify_tofu(config_dir, host, port, &fingerprint)?;

    run_auth_handshake(&mut tls_stream, password).await?;
    wait_for_ready(&mut tls_stream).await?;

    let (reader, writer) = split_boxed(tls_stream);
    Ok(Connection { reader, writer, owns_daemon: false, tls_active: true, child: None })
}

#[cfg(test)]
#[path = "tls_tests.rs"]
mod tests;
