// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only audit log, one JSON object per line, reusing `zfdash-wire`'s
//! line framing so the format matches every other on-disk/wire JSON in this
//! workspace: timestamp, command, return code, duration, and captured
//! output per invocation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use zfdash_core::user_runtime_dir;

const AUDIT_LOG_FILENAME: &str = "zfdash-audit.log";
const TRUNCATE_LIMIT_BYTES: usize = 4 * 1024;
const TRUNCATE_MARKER: &str = "...truncated";

/// One audit log entry: start time, argv, whether stdin was present,
/// return code, duration, and truncated stdout/stderr.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub ts_ms: u64,
    pub argv: String,
    pub stdin_present: bool,
    pub return_code: i32,
    pub duration_ms: u64,
    pub stdout_truncated: bool,
    pub stderr_truncated: bool,
}

/// Path to the audit log for a given caller UID.
pub fn audit_log_path(uid: i32) -> PathBuf {
    user_runtime_dir(uid).join(AUDIT_LOG_FILENAME)
}

/// Truncate a captured output string to `TRUNCATE_LIMIT_BYTES`, appending a
/// marker, returning whether truncation happened.
pub fn truncate_for_audit(s: &str) -> (String, bool) {
    if s.len() <= TRUNCATE_LIMIT_BYTES {
        return (s.to_string(), false);
    }
    let mut end = TRUNCATE_LIMIT_BYTES;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    (format!("{}{}", &s[..end], TRUNCATE_MARKER), true)
}

/// Appends `AuditEntry` records to a per-UID log file.
pub struct AuditLogger {
    path: PathBuf,
}

impl AuditLogger {
    pub fn for_uid(uid: i32) -> Self {
        Self { path: audit_log_path(uid) }
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry as a line of JSON. Logging failures are
    /// intentionally swallowed by callers (best-effort, matching the
    /// original's "warn and continue" behavior) — this returns the error
    /// so the caller can decide.
    pub async fn append(&self, entry: &AuditEntry) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let line = serde_json::to_string(entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        use tokio::io::AsyncWriteExt;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
