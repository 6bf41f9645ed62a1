// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipe transport: the client inherits the spawned
//! daemon's stdin/stdout after launching it through the privilege
//! escalator (see [`crate::launcher`]). The daemon reads from its stdin
//! and writes to its stdout; the client does the mirror image.

use tokio::process::Child;

use crate::ClientError;

use super::Connection;

/// Wrap an already-spawned daemon child process (stdin/stdout piped) as a
/// pipe-mode [`Connection`]. The child's stdout becomes the client's
/// reader, stdin becomes the writer — closing the writer end (dropping
/// it) is what causes the daemon to observe EOF and shut down cleanly
///.
pub fn from_child(mut child: Child) -> Result<Connection, ClientError> {
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| ClientError::CommunicationError("daemon child has no captured stdout".into()))?;
    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| ClientError::CommunicationError("daemon child has no captured stdin".into()))?;

    Ok(Connection {
        reader: Box::new(stdout),
        writer: Box::new(stdin),
        owns_daemon: true,
        tls_active: false,
        child: Some(child),
    })
}

#[cfg(test)]
#[path = "pipe_tests.rs"]
mod tests;
