// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix-domain socket transport: bind at the canonical
//! per-UID path (or an explicit override), probe for a live server first,
//! chmod/chown the socket file to the target user, and accept one
//! connection at a time.

use std::os::unix::net::UnixStream as StdUnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::net::{UnixListener, UnixStream};
use tracing::{info, warn};

use crate::connection::{split_boxed, Connection};

#[derive(Debug, Error)]
pub enum UdsListenError {
    #[error("a daemon is already listening on {0}")]
    AlreadyRunning(PathBuf),

    #[error("failed to remove stale socket {path}: {source}")]
    RemoveStale { path: PathBuf, #[source] source: std::io::Error },

    #[error("failed to create parent directory {path}: {source}")]
    CreateParent { path: PathBuf, #[source] source: std::io::Error },

    #[error("failed to bind {path}: {source}")]
    Bind { path: PathBuf, #[source] source: std::io::Error },

    #[error("failed to set permissions on {path}: {source}")]
    Permissions { path: PathBuf, #[source] source: std::io::Error },

    #[cfg(unix)]
    #[error("failed to chown {path} to {uid}:{gid}: {source}")]
    Chown { path: PathBuf, uid: i32, gid: i32, #[source] source: nix::Error },
}

pub struct UdsListener {
    inner: UnixListener,
    path: PathBuf,
}

impl UdsListener {
    /// Bind a fresh listener at `path`, owned by `uid:gid`.
    ///
    /// Before binding, probes whether a live server already answers at
    /// `path` (a quick connect attempt) and refuses to start if so
    ///: two daemons racing for the same per-UID socket
    /// would otherwise silently steal each other's connections. A file
    /// that exists but answers no one is stale and is unlinked.
    pub async fn bind(path: &Path, uid: i32, gid: i32) -> Result<Self, UdsListenError> {
        if path.exists() {
            if probe_live(path).await {
                return Err(UdsListenError::AlreadyRunning(path.to_path_buf()));
            }
            std::fs::remove_file(path)
                .map_err(|source| UdsListenError::RemoveStale { path: path.to_path_buf(), source })?;
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|source| UdsListenError::CreateParent { path: parent.to_path_buf(), source })?;
        }

        let inner = UnixListener::bind(path).map_err(|source| UdsListenError::Bind { path: path.to_path_buf(), source })?;

        set_permissions(path, uid, gid)?;

        info!(path = %path.display(), uid, gid, "daemon listening on unix socket");
        Ok(Self { inner, path: path.to_path_buf() })
    }

    /// Accept the next connection. The dispatcher calls this again in a
    /// loop after each connection's read loop ends, so only one
    /// connection is ever active at a time.
    pub async fn accept(&self) -> Result<Connection, std::io::Error> {
        let (stream, _addr) = self.inner.accept().await?;
        let (reader, writer) = split_boxed(stream);
        Ok(Connection::new(reader, writer))
    }
}

impl Drop for UdsListener {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// A short-timeout connect attempt to decide if a socket file is backed
/// by a live listener or is left over from an unclean shutdown.
async fn probe_live(path: &Path) -> bool {
    tokio::time::timeout(Duration::from_millis(200), UnixStream::connect(path)).await.is_ok_and(|r| r.is_ok())
}

#[cfg(unix)]
fn set_permissions(path: &Path, uid: i32, gid: i32) -> Result<(), UdsListenError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o660))
        .map_err(|source| UdsListenError::Permissions { path: path.to_path_buf(), source })?;

    use nix::unistd::{chown, Gid, Uid};
    chown(path, Some(Uid::from_raw(uid as u32)), Some(Gid::from_raw(gid as u32)))
        .map_err(|source| UdsListenError::Chown { path: path.to_path_buf(), uid, gid, source })
}

#[cfg(not(unix))]
fn set_permissions(_path: &Path, _uid: i32, _gid: i32) -> Result<(), UdsListenError> {
    Ok(())
}

/// Best-effort synchronous probe used by the `--stop-daemon`/client-side
/// reconnect paths to check "is anything listening" without going through
/// the async runtime. Mirrors [`probe_live`] but blocking.
pub fn probe_live_blocking(path: &Path) -> bool {
    StdUnixStream::connect(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn current_uid_gid() -> (i32, i32) {
        (nix::unistd::getuid().as_raw() as i32, nix::unistd::getgid().as_raw() as i32)
    }

    #[tokio::test]
    async fn bind_creates_socket_with_correct_permissions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.sock");
        let (uid, gid) = current_uid_gid();
        let listener = UdsListener::bind(&path, uid, gid).await.unwrap();
        assert!(path.exists());
        drop(listener);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn bind_refuses_when_already_running() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.sock");
        let (uid, gid) = current_uid_gid();
        let _first = UdsListener::bind(&path, uid, gid).await.unwrap();
        let second = UdsListener::bind(&path, uid, gid).await;
        assert!(matches!(second, Err(UdsListenError::AlreadyRunning(_))));
    }

    #[tokio::test]
    async fn bind_cleans_up_stale_socket_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stale.sock");
        {
            let (uid, gid) = current_uid_gid();
            let listener = UdsListener::bind(&path, uid, gid).await.unwrap();
            // Leak the socket file without removing it, simulating an unclean exit.
            std::mem::forget(listener);
        }
        assert!(path.exists());
        let (uid, gid) = current_uid_gid();
        assert!(UdsListener::bind(&path, uid, gid).await.is_ok());
    }
}
