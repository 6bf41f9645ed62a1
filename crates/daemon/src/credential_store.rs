// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential store: `user_id -> {username, password_info}`, persisted as
//! JSON under [`crate::paths::credentials_path`].
//!
//! Writes go through temp-file + atomic rename; reads always re-read the
//! file from disk rather than trusting an in-memory cache.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use parking_lot::Mutex;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use zfdash_core::credential::{CredentialEntry, PasswordInfo, AUTH_HANDSHAKE_ITERATIONS, AUTH_HANDSHAKE_SALT};

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to read credential store at {path}: {source}")]
    Read { path: PathBuf, #[source] source: io::Error },

    #[error("failed to write credential store at {path}: {source}")]
    Write { path: PathBuf, #[source] source: io::Error },

    #[error("malformed credential store at {path}: {source}")]
    Malformed { path: PathBuf, #[source] source: serde_json::Error },

    #[error("invalid hex in stored credential for user '{user_id}'")]
    InvalidHex { user_id: String },
}

/// Derive a PBKDF2-HMAC-SHA256 key, the same primitive used for both
/// password storage and the TLS-TCP auth handshake response — there is
/// exactly one derivation function in this workspace, so the daemon and
/// the client always agree byte-for-byte.
pub fn derive_key(password: &[u8], salt: &[u8], iterations: u32) -> [u8; 32] {
    let mut out = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut out);
    out
}

/// Hash `password` under a freshly generated random salt.
pub fn hash_password(password: &str, iterations: u32) -> PasswordInfo {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let key = derive_key(password.as_bytes(), &salt, iterations);
    PasswordInfo {
        alg: PasswordInfo::ALG.to_string(),
        salt: hex::encode(salt),
        hash: hex::encode(key),
        iterations,
    }
}

/// Verify `password` against a stored [`PasswordInfo`] in constant time.
pub fn verify_password(password: &str, info: &PasswordInfo) -> Result<bool, CredentialError> {
    let salt = hex::decode(&info.salt).map_err(|_| CredentialError::InvalidHex { user_id: String::new() })?;
    let stored = hex::decode(&info.hash).map_err(|_| CredentialError::InvalidHex { user_id: String::new() })?;
    let derived = derive_key(password.as_bytes(), &salt, info.iterations);
    Ok(bool::from(derived.ct_eq(&stored)))
}

/// The daemon-owned credential store, root-readable.
pub struct CredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn at_default_path() -> Self {
        Self::new(crate::paths::credentials_path())
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Re-read the store from disk. An absent file is an empty store, not
    /// an error — this lets a freshly installed daemon start before any
    /// credential has ever been set.
    pub async fn load(&self) -> Result<HashMap<String, CredentialEntry>, CredentialError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|source| CredentialError::Malformed { path: self.path.clone(), source }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(source) => Err(CredentialError::Read { path: self.path.clone(), source }),
        }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<CredentialEntry>, CredentialError> {
        let entries = self.load().await?;
        Ok(entries.into_values().find(|e| e.username == username))
    }

    async fn save(&self, entries: &HashMap<String, CredentialEntry>) -> Result<(), CredentialError> {
        let _guard = self.write_lock.lock();

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| CredentialError::Write { path: self.path.clone(), source })?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(entries)
            .map_err(|source| CredentialError::Malformed { path: self.path.clone(), source })?;
        tokio::fs::write(&tmp_path, &body)
            .await
            .map_err(|source| CredentialError::Write { path: tmp_path.clone(), source })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = tokio::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600)).await;
        }

        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|source| CredentialError::Write { path: self.path.clone(), source })
    }

    /// Set (or replace) the password for `user_id`/`username`.
    ///
    /// Derives two independent keys from the one plaintext password: the
    /// at-rest `PasswordInfo` (random salt, for storage/rotation) and the
    /// auth handshake key (fixed salt, stored hex-encoded so the daemon
    /// never needs the plaintext again — see [`CredentialEntry::auth_key`]).
    pub async fn upsert_password(&self, user_id: &str, username: &str, password: &str) -> Result<(), CredentialError> {
        let mut entries = self.load().await?;
        let info = hash_password(password, PasswordInfo::DEFAULT_ITERATIONS);
        let auth_key = hex::encode(derive_key(password.as_bytes(), AUTH_HANDSHAKE_SALT, AUTH_HANDSHAKE_ITERATIONS));
        entries.insert(
            user_id.to_string(),
            CredentialEntry { user_id: user_id.to_string(), username: username.to_string(), password: info, auth_key },
        );
        self.save(&entries).await
    }

    /// Seed a single default credential the first time the daemon starts
    /// in agent mode with no credentials on disk at all. Returns `true` if
    /// a credential was created.
    pub async fn create_default_if_missing(&self, username: &str, password: &str) -> Result<bool, CredentialError> {
        let entries = self.load().await?;
        if !entries.is_empty() {
            return Ok(false);
        }
        self.upsert_password("0", username, password).await?;
        Ok(true)
    }
}

#[cfg(test)]
#[path = "credential_store_tests.rs"]
mod tests;
