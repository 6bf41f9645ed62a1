// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted registry of remote agent connections: a flat JSON array of
//! connection identities, keyed by alias. Only `alias`/`host`/`port`/
//! `use_tls` survive a restart — [`AgentConnectionState`] is rebuilt
//! fresh on every load.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use zfdash_core::agent_record::RemoteAgentRecord;

use crate::ClientError;

const REMOTE_AGENTS_FILENAME: &str = "remote_agents.json";

fn store_path(config_dir: &Path) -> PathBuf {
    config_dir.join(REMOTE_AGENTS_FILENAME)
}

/// Load all registered connections. A missing file is an empty registry.
pub fn load(config_dir: &Path) -> Result<Vec<RemoteAgentRecord>, ClientError> {
    let path = store_path(config_dir);
    match fs::read(&path) {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::CommunicationError(format!("malformed remote agent registry {}: {e}", path.display()))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(ClientError::CommunicationError(format!("failed to read {}: {e}", path.display()))),
    }
}

/// Atomically overwrite the registry with `records` (temp-file + rename).
pub fn save(config_dir: &Path, records: &[RemoteAgentRecord]) -> Result<(), ClientError> {
    fs::create_dir_all(config_dir)
        .map_err(|e| ClientError::CommunicationError(format!("failed to create {}: {e}", config_dir.display())))?;

    let path = store_path(config_dir);
    let tmp_path = path.with_extension("json.tmp");
    let body = serde_json::to_vec_pretty(records)
        .map_err(|e| ClientError::CommunicationError(format!("failed to serialize remote agent registry: {e}")))?;
    fs::write(&tmp_path, &body)
        .map_err(|e| ClientError::CommunicationError(format!("failed to write {}: {e}", tmp_path.display())))?;
    fs::rename(&tmp_path, &path)
        .map_err(|e| ClientError::CommunicationError(format!("failed to replace {}: {e}", path.display())))
}

/// Insert `record`, replacing any existing entry with the same alias.
pub fn upsert(config_dir: &Path, record: RemoteAgentRecord) -> Result<(), ClientError> {
    let mut records = load(config_dir)?;
    match records.iter_mut().find(|r| r.alias == record.alias) {
        Some(existing) => *existing = record,
        None => records.push(record),
    }
    save(config_dir, &records)
}

/// Remove the entry with the given alias. Returns `true` if it existed.
pub fn remove(config_dir: &Path, alias: &str) -> Result<bool, ClientError> {
    let mut records = load(config_dir)?;
    let before = records.len();
    records.retain(|r| r.alias != alias);
    let removed = records.len() != before;
    if removed {
        save(config_dir, &records)?;
    }
    Ok(removed)
}

#[cfg(test)]
#[path = "agent_store_tests.rs"]
mod tests;
