// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server certificate lifecycle for TLS-TCP agent mode: generate a
//! self-signed certificate on first run, then load the same PEM pair on
//! every subsequent start so a client's pinned TOFU fingerprint keeps
//! matching.
//!
//! The key pair is RSA-2048: generated with the `rsa` crate, encoded as
//! PKCS#8 DER, then handed to `rcgen::KeyPair::from_der` so `rcgen` signs
//! the certificate with it directly rather than generating its own key.

use std::io;
use std::path::Path;

use rcgen::{CertificateParams, DistinguishedName, DnType, Ia5String, KeyPair, SanType};
use rsa::pkcs8::EncodePrivateKey;
use rsa::RsaPrivateKey;
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};

use crate::paths;

/// RSA modulus size for the generated agent-mode server certificate.
const RSA_KEY_BITS: usize = 2048;

#[derive(Debug, Error)]
pub enum CertError {
    #[error("failed to read {path}: {source}")]
    Read { path: std::path::PathBuf, #[source] source: io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: std::path::PathBuf, #[source] source: io::Error },

    #[error("failed to generate self-signed certificate: {0}")]
    Generate(#[from] rcgen::Error),

    #[error("failed to generate RSA-{RSA_KEY_BITS} private key: {0}")]
    RsaKeyGen(#[from] rsa::Error),

    #[error("failed to encode RSA private key as PKCS#8 DER: {0}")]
    RsaEncode(#[from] rsa::pkcs8::Error),
}

/// Validity window for a freshly generated certificate: ten years, matching
/// the long-lived, rarely-rotated nature of a TOFU-pinned host key.
const VALIDITY_DAYS: i64 = 3650;

/// PEM-encoded certificate and private key, ready to hand to
/// [`crate::tls::server_config`].
pub struct CertificatePair {
    pub cert_pem: String,
    pub key_pem: String,
}

/// Load the existing cert/key pair from disk, generating and persisting a
/// new self-signed pair the first time either file is missing.
pub async fn load_or_generate() -> Result<CertificatePair, CertError> {
    let cert_path = paths::server_cert_path();
    let key_path = paths::server_key_path();

    match (tokio::fs::read_to_string(&cert_path).await, tokio::fs::read_to_string(&key_path).await) {
        (Ok(cert_pem), Ok(key_pem)) => Ok(CertificatePair { cert_pem, key_pem }),
        _ => {
            let pair = generate()?;
            persist(&cert_path, &key_path, &pair).await?;
            Ok(pair)
        }
    }
}

pub(crate) fn generate() -> Result<CertificatePair, CertError> {
    let mut params = CertificateParams::new(Vec::new())?;

    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, "ZfDash Agent");
    dn.push(DnType::OrganizationName, "ZfDash");
    params.distinguished_name = dn;

    #[allow(clippy::expect_used)]
    let localhost_san = Ia5String::try_from("localhost".to_string()).expect("ascii literal is valid IA5String");

    params.subject_alt_names = vec![
        SanType::DnsName(localhost_san),
        SanType::IpAddress(std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1))),
        SanType::IpAddress(std::net::IpAddr::V6(std::net::Ipv6Addr::LOCALHOST)),
    ];

    let now = OffsetDateTime::now_utc();
    params.not_before = now - TimeDuration::days(1);
    params.not_after = now + TimeDuration::days(VALIDITY_DAYS);

    let rsa_key = RsaPrivateKey::new(&mut rand::thread_rng(), RSA_KEY_BITS)?;
    let key_der = rsa_key.to_pkcs8_der()?;
    let key_pair = KeyPair::from_der(key_der.as_bytes())?;
    let cert = params.self_signed(&key_pair)?;

    Ok(CertificatePair { cert_pem: cert.pem(), key_pem: key_pair.serialize_pem() })
}

async fn persist(cert_path: &Path, key_path: &Path, pair: &CertificatePair) -> Result<(), CertError> {
    if let Some(parent) = cert_path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|source| CertError::Write { path: parent.to_path_buf(), source })?;
    }

    tokio::fs::write(cert_path, &pair.cert_pem)
        .await
        .map_err(|source| CertError::Write { path: cert_path.to_path_buf(), source })?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = tokio::fs::set_permissions(cert_path, std::fs::Permissions::from_mode(0o644)).await;
    }

    tokio::fs::write(key_path, &pair.key_pem)
        .await
        .map_err(|source| CertError::Write { path: key_path.to_path_buf(), source })?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = tokio::fs::set_permissions(key_path, std::fs::Permissions::from_mode(0o600)).await;
    }

    Ok(())
}

#[cfg(test)]
#[path = "cert_tests.rs"]
mod tests;
