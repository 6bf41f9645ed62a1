// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix-domain socket transport: connects to the
//! canonical per-UID socket path, never derived from an environment
//! variable so a root daemon and an unprivileged client always agree on
//! it.

use std::path::{Path, PathBuf};

use tokio::net::UnixStream;

use zfdash_core::user_runtime_dir;

use crate::ClientError;

use super::{split_boxed, Connection};

const SOCKET_FILENAME: &str = "zfdash.sock";

/// The canonical socket path for `uid`. Mirrors
/// `zfdash-daemon::paths::canonical_socket_path` exactly; duplicated here
/// rather than depending on the daemon crate (same reasoning as
/// [`crate::handshake::compute_auth_response`]).
pub fn canonical_socket_path(uid: i32) -> PathBuf {
    user_runtime_dir(uid).join(SOCKET_FILENAME)
}

/// Connect to a UDS at `path`, producing a plain (non-owning) connection.
pub async fn connect(path: &Path) -> Result<Connection, ClientError> {
    let stream = UnixStream::connect(path).await.map_err(|e| {
        ClientError::CommunicationError(format!("failed to connect to socket {}: {e}", path.display()))
    })?;
    let (reader, writer) = split_boxed(stream);
    Ok(Connection::plain(reader, writer, false))
}

/// Connect to the canonical socket for `uid`.
pub async fn connect_for_uid(uid: i32) -> Result<Connection, ClientError> {
    connect(&canonical_socket_path(uid)).await
}

#[cfg(test)]
#[path = "uds_tests.rs"]
mod tests;
