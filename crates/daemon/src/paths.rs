// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem layout, deliberately independent of the
//! environment: the daemon's runtime paths and persistent data root are
//! fixed so a root daemon and an unprivileged client always agree on them.

use std::path::PathBuf;

use zfdash_core::user_runtime_dir;

const DAEMON_LOG_FILENAME: &str = "zfdash-daemon.log";
const SOCKET_FILENAME: &str = "zfdash.sock";

/// Per-UID runtime directory (socket, log) for `uid`.
pub fn runtime_dir(uid: i32) -> PathBuf {
    user_runtime_dir(uid)
}

/// Canonical UDS path for `uid` — never derived from an environment
/// variable.
pub fn canonical_socket_path(uid: i32) -> PathBuf {
    runtime_dir(uid).join(SOCKET_FILENAME)
}

/// Daemon log file path for `uid`, 0660 and owned by the requesting user.
pub fn daemon_log_path(uid: i32) -> PathBuf {
    runtime_dir(uid).join(DAEMON_LOG_FILENAME)
}

/// Persistent, root-owned data root holding credentials and the agent-mode
/// TLS certificate/key. GUI/web-layer artifacts (e.g. a
/// Flask session secret) are out of scope for this workspace.
pub fn data_root() -> PathBuf {
    if cfg!(target_os = "macos") {
        PathBuf::from("/Library/Application Support/ZfDash")
    } else {
        PathBuf::from("/etc/zfdash")
    }
}

pub fn credentials_path() -> PathBuf {
    data_root().join("credentials.json")
}

pub fn server_cert_path() -> PathBuf {
    data_root().join("server-cert.pem")
}

pub fn server_key_path() -> PathBuf {
    data_root().join("server-key.pem")
}
