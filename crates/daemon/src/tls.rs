// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TLS server setup for agent mode: wraps a
//! [`crate::cert::CertificatePair`] in a `rustls` `ServerConfig` and hands
//! back the `tokio-rustls` acceptor the listener wraps each accepted
//! socket with.

use std::io;
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;
use thiserror::Error;
use tokio_rustls::TlsAcceptor;

use crate::cert::CertificatePair;

#[derive(Debug, Error)]
pub enum TlsSetupError {
    #[error("no certificate found in PEM data")]
    NoCertificate,

    #[error("no private key found in PEM data")]
    NoPrivateKey,

    #[error("failed to parse PEM data: {0}")]
    PemParse(#[source] io::Error),

    #[error("invalid TLS configuration: {0}")]
    Config(#[from] rustls::Error),
}

/// Build a `tokio-rustls` acceptor from a loaded certificate pair.
pub fn acceptor_from(pair: &CertificatePair) -> Result<TlsAcceptor, TlsSetupError> {
    let certs: Vec<CertificateDer<'static>> = rustls_pemfile::certs(&mut pair.cert_pem.as_bytes())
        .collect::<Result<_, _>>()
        .map_err(TlsSetupError::PemParse)?;
    if certs.is_empty() {
        return Err(TlsSetupError::NoCertificate);
    }

    let key: PrivateKeyDer<'static> = rustls_pemfile::private_key(&mut pair.key_pem.as_bytes())
        .map_err(TlsSetupError::PemParse)?
        .ok_or(TlsSetupError::NoPrivateKey)?;

    let config = ServerConfig::builder().with_no_client_auth().with_single_cert(certs, key)?;

    Ok(TlsAcceptor::from(Arc::new(config)))
}
