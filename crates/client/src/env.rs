// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the client runtime: one
//! function per knob, each with a typed fallback, so no `std::env::var`
//! call appears outside this module.

use std::time::Duration;

/// Timeout for the plaintext version-hello round trip.
pub const HELLO_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for each leg of the post-TLS auth handshake.
pub const AUTH_RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

/// Bounded wait for the daemon's `{"ready": true}` line after the
/// transport and any handshake are established.
pub const READY_TIMEOUT: Duration = Duration::from_secs(10);

/// Default per-request timeout when a caller doesn't specify one.
pub fn default_request_timeout() -> Duration {
    std::env::var("ZFDASH_CLIENT_REQUEST_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(30))
}

/// Timeout for the best-effort `shutdown_daemon` request sent during an
/// owns-daemon close.
pub fn shutdown_request_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Grace period between SIGTERM and SIGKILL when terminating an
/// owned daemon child process.
pub fn terminate_grace_period() -> Duration {
    std::env::var("ZFDASH_CLIENT_TERMINATE_GRACE_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}
