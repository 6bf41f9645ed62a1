// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The privilege-escalated daemon launcher: finds an escalation tool from
//! a fixed priority list and spawns the daemon through it.
//!
//! Kept behind a [`DaemonLauncher`] trait so the escalator search and
//! per-platform argument shape stay swappable without touching call
//! sites in `zfdash-cli`.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::{info, warn};

use crate::handshake::wait_for_ready;
use crate::transport::{pipe, uds, Connection};
use crate::ClientError;

/// Escalation tools tried in order, mirroring the original's
/// GUI-escalator-first priority (`pkexec` before the terminal-oriented
/// `sudo`/`doas`) so a desktop session doesn't fall back to a blocking
/// terminal password prompt.
const ESCALATOR_PRIORITY: &[&str] = &["pkexec", "sudo", "doas"];

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("no privilege escalation tool found (tried: {})", ESCALATOR_PRIORITY.join(", "))]
    NoEscalator,

    #[error("failed to spawn daemon via {escalator}: {source}")]
    Spawn { escalator: &'static str, #[source] source: std::io::Error },

    #[error("daemon did not signal readiness within the timeout")]
    ReadyTimeout,

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Which transport the launched daemon should listen on. TLS-TCP agent
/// mode is deliberately absent: a remote agent already runs independently
/// on its own host and is never spawned by this process's escalator
/// (only covers launching the *local* privileged daemon).
#[derive(Debug, Clone)]
pub enum LaunchTransport {
    Pipe,
    Uds { path: Option<PathBuf> },
}

/// How long to wait for a freshly spawned daemon's socket to accept
/// connections before giving up.
const SOCKET_POLL_TIMEOUT: Duration = Duration::from_secs(10);
const SOCKET_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[async_trait::async_trait]
pub trait DaemonLauncher: Send + Sync {
    /// Spawn `daemon_path` (already resolved to an executable) escalated
    /// to root, targeting `uid`/`gid`, listening on `transport`. Returns
    /// a [`Connection`] only after the daemon's `ready` line has been
    /// observed.
    async fn launch(
        &self,
        daemon_path: &Path,
        uid: i32,
        gid: i32,
        transport: LaunchTransport,
    ) -> Result<Connection, LaunchError>;
}

/// The production launcher: finds a real escalation tool on `PATH` and
/// spawns the daemon through it.
pub struct EscalatedLauncher;

impl EscalatedLauncher {
    pub fn new() -> Self {
        Self
    }

    fn find_escalator() -> Result<&'static str, LaunchError> {
        for candidate in ESCALATOR_PRIORITY {
            if which(candidate) {
                return Ok(candidate);
            }
        }
        Err(LaunchError::NoEscalator)
    }

    fn build_command(escalator: &'static str, daemon_path: &Path, uid: i32, gid: i32, transport: &LaunchTransport) -> Command {
        let mut cmd = Command::new(escalator);
        cmd.arg(daemon_path);
        cmd.arg("--daemon");
        cmd.args(["--uid", &uid.to_string()]);
        cmd.args(["--gid", &gid.to_string()]);

        match transport {
            LaunchTransport::Pipe => {}
            LaunchTransport::Uds { path } => {
                cmd.arg("--listen-socket");
                if let Some(path) = path {
                    cmd.arg(path);
                }
            }
        }
        cmd
    }
}

impl Default for EscalatedLauncher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DaemonLauncher for EscalatedLauncher {
    async fn launch(
        &self,
        daemon_path: &Path,
        uid: i32,
        gid: i32,
        transport: LaunchTransport,
    ) -> Result<Connection, LaunchError> {
        let escalator = Self::find_escalator()?;
        let mut cmd = Self::build_command(escalator, daemon_path, uid, gid, &transport);

        match transport {
            LaunchTransport::Pipe => {
                cmd.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::null());
                let child = cmd.spawn().map_err(|source| LaunchError::Spawn { escalator, source })?;

                let mut conn = pipe::from_child(child).map_err(LaunchError::Client)?;
                match tokio::time::timeout(SOCKET_POLL_TIMEOUT, wait_for_ready(&mut conn.reader)).await {
                    Ok(Ok(())) => {
                        info!("daemon ready (pipe mode)");
                        Ok(conn)
                    }
                    Ok(Err(e)) => {
                        kill_orphan(&mut conn).await;
                        Err(LaunchError::Client(e))
                    }
                    Err(_) => {
                        kill_orphan(&mut conn).await;
                        Err(LaunchError::ReadyTimeout)
                    }
                }
            }
            LaunchTransport::Uds { path } => {
                cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
                let mut child = cmd.spawn().map_err(|source| LaunchError::Spawn { escalator, source })?;

                let socket_path = path.unwrap_or_else(|| uds::canonical_socket_path(uid));
                if let Err(e) = wait_for_socket(&socket_path).await {
                    let _ = child.start_kill();
                    return Err(e);
                }

                match uds::connect(&socket_path).await {
                    Ok(mut conn) => match tokio::time::timeout(SOCKET_POLL_TIMEOUT, wait_for_ready(&mut conn.reader)).await {
                        Ok(Ok(())) => {
                            info!(path = %socket_path.display(), "daemon ready (socket mode)");
                            Ok(conn)
                        }
                        Ok(Err(e)) => Err(LaunchError::Client(e)),
                        Err(_) => Err(LaunchError::ReadyTimeout),
                    },
                    Err(e) => {
                        let _ = child.start_kill();
                        Err(LaunchError::Client(e))
                    }
                }
            }
        }
    }
}

/// Best-effort cleanup when a pipe-mode launch fails after spawning: the
/// client owns this child and must not leave it orphaned.
async fn kill_orphan(conn: &mut Connection) {
    if let Some(mut child) = conn.child.take() {
        if let Err(e) = child.start_kill() {
            warn!("failed to kill orphaned daemon process: {e}");
        }
    }
}

/// Poll for the daemon's socket file to appear and accept a probe
/// connection, bounded by [`SOCKET_POLL_TIMEOUT`].
async fn wait_for_socket(path: &Path) -> Result<(), LaunchError> {
    let deadline = tokio::time::Instant::now() + SOCKET_POLL_TIMEOUT;
    loop {
        if tokio::net::UnixStream::connect(path).await.is_ok() {
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(LaunchError::ReadyTimeout);
        }
        tokio::time::sleep(SOCKET_POLL_INTERVAL).await;
    }
}

/// A minimal `which`: true if `name` resolves to an executable on `PATH`.
/// Not shelling out to the `which` binary itself, since its presence is
/// exactly as uncertain as the escalators it would be used to find.
fn which(name: &str) -> bool {
    let Some(path_var) = std::env::var_os("PATH") else { return false };
    std::env::split_paths(&path_var).any(|dir| is_executable(&dir.join(name)))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path).map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0).unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
#[path = "launcher_tests.rs"]
mod tests;
