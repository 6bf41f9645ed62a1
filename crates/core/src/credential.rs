// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential store records: PBKDF2-hashed passwords for TCP agent auth.
//! Salt and derived key are stored hex-encoded alongside the algorithm
//! name and iteration count so the scheme can be upgraded later without
//! breaking deserialization of older entries.

use serde::{Deserialize, Serialize};

/// PBKDF2-HMAC-SHA256 derived password material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordInfo {
    /// e.g. "pbkdf2_sha256".
    pub alg: String,
    /// Hex-encoded random salt.
    pub salt: String,
    /// Hex-encoded derived key.
    pub hash: String,
    pub iterations: u32,
}

impl PasswordInfo {
    pub const ALG: &'static str = "pbkdf2_sha256";
    /// OWASP-recommended PBKDF2-HMAC-SHA256 iteration count; the default
    /// new entries get. Stored entries must never fall below
    /// [`Self::MIN_ITERATIONS`].
    pub const DEFAULT_ITERATIONS: u32 = 260_000;
    pub const MIN_ITERATIONS: u32 = 100_000;
}

/// One user's stored credential, keyed by `user_id` in the credential file.
///
/// `password` is the at-rest PBKDF2 hash (random per-user salt, used only
/// to verify/rotate the stored password). `auth_key` is a *separate*
/// PBKDF2-HMAC-SHA256 derivation over [`AUTH_HANDSHAKE_SALT`], computed
/// once from the plaintext password at credential-creation time and then
/// used directly as the TLS-TCP auth handshake's HMAC key. Deriving it
/// with a fixed, compiled-in salt rather than `password.salt` means the
/// client can recompute the identical key from the password alone, with
/// no additional round trip to learn the server's random salt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialEntry {
    pub user_id: String,
    pub username: String,
    pub password: PasswordInfo,
    /// Hex-encoded PBKDF2-HMAC-SHA256 handshake key.
    pub auth_key: String,
}

/// Fixed salt for the TLS-TCP auth handshake's key derivation, distinct
/// from the per-handshake random nonce and from `PasswordInfo::salt`'s
/// per-user random salt.
pub const AUTH_HANDSHAKE_SALT: &[u8] = b"zfdash-tcp-auth-handshake-v1";

/// Iteration count for the auth handshake key derivation. Fixed (not
/// configurable per credential) so both ends agree without exchanging it.
pub const AUTH_HANDSHAKE_ITERATIONS: u32 = 200_000;
