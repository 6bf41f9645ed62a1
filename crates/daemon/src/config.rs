// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup configuration, assembled from `zfdash-cli`'s parsed CLI
//! flags into one explicitly-threaded struct rather than a process-wide
//! global.

use std::path::PathBuf;

/// Which transport the daemon should listen on, chosen by `zfdash-cli`
/// from the `--listen-socket`/`--agent`/(neither, meaning pipe) flags.
#[derive(Debug, Clone)]
pub enum TransportMode {
    /// Read from stdin, write to stdout. The default when
    /// neither `--listen-socket` nor `--agent` is given.
    Pipe,
    /// Unix-domain socket at `path`, or the canonical per-UID path when
    /// `None`.
    Uds { path: Option<PathBuf> },
    /// TCP agent mode, TLS mandatory unless `use_tls` is
    /// `false` (`--no-tls`).
    Agent { port: u16, use_tls: bool },
}

/// Everything [`crate::dispatch::run`] needs to start serving.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub transport: TransportMode,
    /// Target user the daemon operates for (`--uid`): governs
    /// socket/log ownership and runtime-dir resolution.
    pub uid: i32,
    pub gid: i32,
    pub debug: bool,
}
