// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TLS-TCP authentication handshake: the server
//! issues a random nonce, the client answers with an HMAC over it keyed by
//! its PBKDF2-derived password key, and the server compares in constant
//! time against the stored credential.

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use zfdash_core::credential::{CredentialEntry, AUTH_HANDSHAKE_ITERATIONS, AUTH_HANDSHAKE_SALT};
use zfdash_wire::AuthChallenge;

use crate::env::{AUTH_TIMEOUT, NONCE_BYTES};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum AuthVerifyError {
    #[error("malformed credential or response")]
    Malformed,
}

/// Build a fresh challenge, returning both the wire frame (hex nonce) and
/// the raw nonce bytes the caller needs to verify the response against.
pub fn generate_challenge() -> (AuthChallenge, Vec<u8>) {
    let mut nonce = vec![0u8; NONCE_BYTES];
    rand::thread_rng().fill_bytes(&mut nonce);
    let challenge = AuthChallenge { nonce: hex::encode(&nonce), timeout: AUTH_TIMEOUT.as_secs() };
    (challenge, nonce)
}

/// Verify a client's hex-encoded HMAC response against `nonce`.
///
/// `entry.auth_key` is already the PBKDF2-derived handshake key (computed
/// once from the plaintext password when the credential was set), so the
/// server never needs the plaintext again — it HMACs the nonce with that
/// stored key and compares in constant time.
pub fn verify_response(entry: &CredentialEntry, nonce: &[u8], response_hex: &str) -> Result<bool, AuthVerifyError> {
    let key = hex::decode(&entry.auth_key).map_err(|_| AuthVerifyError::Malformed)?;
    let provided = hex::decode(response_hex).map_err(|_| AuthVerifyError::Malformed)?;
    let mut mac = HmacSha256::new_from_slice(&key).map_err(|_| AuthVerifyError::Malformed)?;
    mac.update(nonce);
    let expected = mac.finalize().into_bytes();
    Ok(bool::from(expected.as_slice().ct_eq(&provided)))
}

/// Compute the client-side response for `password` against `nonce`.
///
/// Used by `zfdash-client`'s runtime: since [`AUTH_HANDSHAKE_SALT`] and
/// [`AUTH_HANDSHAKE_ITERATIONS`] are fixed constants shared by both ends,
/// the client can derive the identical key from the password alone, with
/// no round trip to learn the server's (different, random) storage salt.
pub fn compute_response(password: &str, nonce: &[u8]) -> Result<String, AuthVerifyError> {
    let key = crate::credential_store::derive_key(password.as_bytes(), AUTH_HANDSHAKE_SALT, AUTH_HANDSHAKE_ITERATIONS);
    let mut mac = HmacSha256::new_from_slice(&key).map_err(|_| AuthVerifyError::Malformed)?;
    mac.update(nonce);
    Ok(hex::encode(mac.finalize().into_bytes()))
}
