// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipe transport: the daemon's own stdin/stdout, already
//! connected to the launching client's end of a pair of anonymous pipes
//! before this process ever runs. There is exactly one connection, and
//! the accept loop degenerates to "yield it once, then exit on EOF".

use crate::connection::Connection;

/// Wrap the process's own stdin/stdout as the single pipe-mode connection.
pub fn accept() -> Connection {
    Connection::new(Box::new(tokio::io::stdin()), Box::new(tokio::io::stdout()))
}
