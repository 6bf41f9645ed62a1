// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the runner crate.

use std::time::Duration;

/// Default per-command timeout.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

/// Command execution timeout: `ZFDASH_COMMAND_TIMEOUT_MS` override, else the default.
pub fn command_timeout() -> Duration {
    std::env::var("ZFDASH_COMMAND_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_COMMAND_TIMEOUT)
}

/// Whether audit logging is enabled for this process. The per-request
/// `log_enabled` flag in `RequestMeta` still gates individual entries;
/// this is a hard kill switch, e.g. for tests.
pub fn audit_log_enabled() -> bool {
    std::env::var("ZFDASH_DISABLE_AUDIT_LOG").is_err()
}
