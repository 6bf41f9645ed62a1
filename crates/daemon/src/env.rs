// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate: one
//! function per knob, each with a typed fallback, so no `std::env::var`
//! call appears outside this module. The daemon's *runtime paths*
//! (socket, log) are deliberately NOT resolved here — see
//! [`crate::paths`], which is intentionally environment-independent — but
//! every other tunable still goes through this file.

use std::time::Duration;

/// Timeout for the version-hello line (normative: 5s).
pub const HELLO_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout the client has to answer the auth challenge (normative: 30s).
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(30);

/// Nonce size for the auth challenge (normative: 32 bytes).
pub const NONCE_BYTES: usize = 32;

/// How long a connection's read loop waits for the next request line
/// before treating the peer as idle-but-alive. Overridable for tests.
pub fn ipc_read_timeout() -> Duration {
    std::env::var("ZFDASH_IPC_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(300))
}

/// Grace period the shutdown sequence waits for in-flight worker tasks to
/// drain before the process exits (bounded, ≈10s default).
pub fn shutdown_drain_timeout() -> Duration {
    std::env::var("ZFDASH_DRAIN_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(10))
}

/// Size of the bounded worker pool that executes non-`shutdown_daemon`
/// commands.
pub fn worker_pool_size() -> usize {
    std::env::var("ZFDASH_WORKER_CONCURRENCY")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(8)
}
