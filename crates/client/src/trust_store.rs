// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trust-on-first-use certificate pinning store:
//! `{host}:{port} -> {fingerprint, first_seen, last_verified}`, persisted
//! under the user's config directory.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use zfdash_core::clock::{Clock, SystemClock};
use zfdash_core::trust::TrustedCertificate;

use crate::ClientError;

const TRUSTED_CERTS_FILENAME: &str = "trusted_certs.json";

/// The user's ZfDash config directory ("User config"), rooted
/// under the platform config directory (`~/.config` on Linux, `~/Library/
/// Application Support` on macOS).
pub fn default_config_dir() -> Result<PathBuf, ClientError> {
    dirs::config_dir()
        .map(|dir| dir.join("zfdash"))
        .ok_or_else(|| ClientError::CommunicationError("could not resolve user config directory".into()))
}

fn store_path(config_dir: &Path) -> PathBuf {
    config_dir.join(TRUSTED_CERTS_FILENAME)
}

fn host_key(host: &str, port: u16) -> String {
    format!("{host}:{port}")
}

/// Load the full trusted-certificate map. A missing file is an empty map,
/// not an error.
pub fn load(config_dir: &Path) -> Result<HashMap<String, TrustedCertificate>, ClientError> {
    let path = store_path(config_dir);
    match fs::read(&path) {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::CommunicationError(format!("malformed trusted cert store {}: {e}", path.display()))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(HashMap::new()),
        Err(e) => Err(ClientError::CommunicationError(format!("failed to read {}: {e}", path.display()))),
    }
}

/// Upsert one entry and atomically rewrite the whole store (temp-file +
/// rename, shared-resource policy).
pub fn save(config_dir: &Path, host_key: &str, record: &TrustedCertificate) -> Result<(), ClientError> {
    fs::create_dir_all(config_dir)
        .map_err(|e| ClientError::CommunicationError(format!("failed to create {}: {e}", config_dir.display())))?;

    let mut store = load(config_dir)?;
    store.insert(host_key.to_string(), record.clone());

    let path = store_path(config_dir);
    let tmp_path = path.with_extension("json.tmp");
    let body = serde_json::to_vec_pretty(&store)
        .map_err(|e| ClientError::CommunicationError(format!("failed to serialize trust store: {e}")))?;
    fs::write(&tmp_path, &body)
        .map_err(|e| ClientError::CommunicationError(format!("failed to write {}: {e}", tmp_path.display())))?;
    fs::rename(&tmp_path, &path)
        .map_err(|e| ClientError::CommunicationError(format!("failed to replace {}: {e}", path.display())))
}

/// Remove the pinned entry for `host:port`, for re-trusting after an
/// intentional certificate rotation. Returns `true` if an entry was
/// removed.
pub fn remove(config_dir: &Path, host: &str, port: u16) -> Result<bool, ClientError> {
    let mut store = load(config_dir)?;
    let removed = store.remove(&host_key(host, port)).is_some();
    if removed {
        let path = store_path(config_dir);
        let tmp_path = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(&store)
            .map_err(|e| ClientError::CommunicationError(format!("failed to serialize trust store: {e}")))?;
        fs::write(&tmp_path, &body)
            .map_err(|e| ClientError::CommunicationError(format!("failed to write {}: {e}", tmp_path.display())))?;
        fs::rename(&tmp_path, &path)
            .map_err(|e| ClientError::CommunicationError(format!("failed to replace {}: {e}", path.display())))?;
    }
    Ok(removed)
}

/// Verify `fingerprint` against the pinned entry for `host:port`.
///
/// First contact auto-trusts and persists; a match updates
/// `last_verified`; a mismatch returns [`ClientError::CertificateMismatch`]
/// and leaves the store untouched.
pub fn verify_tofu(config_dir: &Path, host: &str, port: u16, fingerprint: &str) -> Result<(), ClientError> {
    verify_tofu_with_clock(config_dir, host, port, fingerprint, &SystemClock)
}

fn verify_tofu_with_clock(
    config_dir: &Path,
    host: &str,
    port: u16,
    fingerprint: &str,
    clock: &impl Clock,
) -> Result<(), ClientError> {
    let key = host_key(host, port);
    let store = load(config_dir)?;

    match store.get(&key) {
        None => {
            let now = clock.epoch_ms();
            save(
                config_dir,
                &key,
                &TrustedCertificate {
                    fingerprint: fingerprint.to_string(),
                    first_seen_epoch_ms: now,
                    last_verified_epoch_ms: now,
                },
            )
        }
        Some(existing) if existing.fingerprint == fingerprint => save(
            config_dir,
            &key,
            &TrustedCertificate {
                fingerprint: fingerprint.to_string(),
                first_seen_epoch_ms: existing.first_seen_epoch_ms,
                last_verified_epoch_ms: clock.epoch_ms(),
            },
        ),
        Some(existing) => Err(ClientError::CertificateMismatch {
            host_key: key,
            expected: existing.fingerprint.clone(),
            received: fingerprint.to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "trust_store_tests.rs"]
mod tests;
