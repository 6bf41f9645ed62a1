// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The client runtime: owns one [`Connection`], multiplexes concurrent
//! requests over it by `request_id`, and (for pipe-mode connections it
//! spawned) escalates from a polite shutdown request to `SIGTERM` to
//! `SIGKILL` on close.
//!
//! A background reader task continuously decodes response lines and
//! completes the matching caller's oneshot; `detect_client_disconnect`'s
//! `CancellationToken` pattern from the daemon's connection handler is
//! reused here the other way around — cancelling the reader task cleanly
//! on [`ClientRuntime::close`] instead of detecting a disconnecting peer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::io::BufReader;
use tokio::sync::{oneshot, Mutex as AsyncMutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use zfdash_wire::{decode_line, encode_line, read_line, write_line, Request, Response};

use crate::env::default_request_timeout;
use crate::transport::{BoxedWriter, Connection};
use crate::ClientError;

#[cfg(unix)]
use tokio::process::Child;

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Response, ClientError>>>>>;

/// A live, running connection to a daemon (local or remote), ready to
/// carry concurrent requests.
pub struct ClientRuntime {
    writer: AsyncMutex<BoxedWriter>,
    pending: PendingMap,
    next_request_id: AtomicU64,
    reader_shutdown: CancellationToken,
    reader_task: Mutex<Option<tokio::task::JoinHandle<()>>>,
    /// Cleared by the reader task the moment it stops, for any reason —
    /// mirrors `ZfsManagerClient.is_connection_healthy`'s check of whether
    /// its reader thread is still alive.
    alive: Arc<AtomicBool>,
    owns_daemon: bool,
    tls_active: bool,
    #[cfg(unix)]
    child: AsyncMutex<Option<Child>>,
}

impl ClientRuntime {
    /// Take ownership of `conn` and start its background reader task.
    pub fn spawn(conn: Connection) -> Self {
        let Connection { reader, writer, owns_daemon, tls_active, child } = conn;

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let reader_shutdown = CancellationToken::new();
        let alive = Arc::new(AtomicBool::new(true));

        let task_pending = Arc::clone(&pending);
        let task_token = reader_shutdown.clone();
        let task_alive = Arc::clone(&alive);
        let reader_task = tokio::spawn(reader_loop(reader, task_pending, task_token, task_alive));

        Self {
            writer: AsyncMutex::new(writer),
            pending,
            next_request_id: AtomicU64::new(1),
            reader_shutdown,
            reader_task: Mutex::new(Some(reader_task)),
            alive,
            owns_daemon,
            tls_active,
            #[cfg(unix)]
            child: AsyncMutex::new(child),
        }
    }

    pub fn tls_active(&self) -> bool {
        self.tls_active
    }

    pub fn owns_daemon(&self) -> bool {
        self.owns_daemon
    }

    /// `true` as long as the background reader task is still running.
    /// Goes `false` permanently once the connection drops, closes, or a
    /// protocol error tears down the reader — the single source of truth
    /// [`crate::control_center::ControlCenterManager`] polls to decide
    /// whether a registered agent's connection is actually still alive.
    pub fn is_healthy(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Send `command` with `kwargs` and wait for its response, subject to
    /// [`default_request_timeout`]. Cancelling the returned future (e.g. by
    /// dropping it) does not cancel the in-flight request on the daemon
    /// side; the reader task still reaps and discards its eventual reply.
    pub async fn request(&self, command: impl Into<String>, kwargs: Map<String, Value>) -> Result<Response, ClientError> {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(request_id, tx);

        let request = Request::new(command, request_id).with_kwargs(kwargs);
        let line = encode_line(&request).map_err(|e| ClientError::ProtocolError(e.to_string()))?;

        if let Err(e) = self.write_line(&line).await {
            self.pending.lock().remove(&request_id);
            return Err(e);
        }

        match tokio::time::timeout(default_request_timeout(), rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(ClientError::RemoteAgentDisconnected("reader task closed before replying".into())),
            Err(_) => {
                self.pending.lock().remove(&request_id);
                Err(ClientError::Timeout(default_request_timeout()))
            }
        }
    }

    async fn write_line(&self, line: &str) -> Result<(), ClientError> {
        let mut writer = self.writer.lock().await;
        write_line(&mut *writer, line).await.map_err(|e| ClientError::CommunicationError(e.to_string()))
    }

    /// Politely ask the daemon to shut down, then stop the reader task.
    /// If this runtime owns the daemon process (pipe mode), escalates to
    /// `SIGTERM` then `SIGKILL` if the process hasn't exited within
    /// [`crate::env::terminate_grace_period`].
    pub async fn close(&self) -> Result<(), ClientError> {
        let shutdown_timeout = crate::env::shutdown_request_timeout();
        let request = Request::new("shutdown_daemon", self.next_request_id.fetch_add(1, Ordering::Relaxed));
        if let Ok(line) = encode_line(&request) {
            let _ = tokio::time::timeout(shutdown_timeout, self.write_line(&line)).await;
        }

        self.reader_shutdown.cancel();
        if let Some(task) = self.reader_task.lock().take() {
            let _ = task.await;
        }

        self.fail_all_pending();

        #[cfg(unix)]
        self.terminate_owned_child().await?;

        Ok(())
    }

    fn fail_all_pending(&self) {
        let mut pending = self.pending.lock();
        for (_, tx) in pending.drain() {
            let _ = tx.send(Err(ClientError::RemoteAgentDisconnected("connection closed".into())));
        }
    }

    #[cfg(unix)]
    async fn terminate_owned_child(&self) -> Result<(), ClientError> {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        if !self.owns_daemon {
            return Ok(());
        }
        let mut guard = self.child.lock().await;
        let Some(child) = guard.as_mut() else { return Ok(()) };

        let Some(raw_pid) = child.id() else {
            return Ok(());
        };
        let pid = Pid::from_raw(raw_pid as i32);

        if kill(pid, Signal::SIGTERM).is_err() {
            return Ok(());
        }

        let grace = crate::env::terminate_grace_period();
        match tokio::time::timeout(grace, child.wait()).await {
            Ok(Ok(_)) => {}
            _ => {
                warn!(pid = raw_pid, "daemon did not exit after SIGTERM, sending SIGKILL");
                let _ = kill(pid, Signal::SIGKILL);
                let _ = child.wait().await;
            }
        }
        Ok(())
    }
}

/// Continuously decode response lines from `reader` and complete the
/// matching caller's oneshot, until EOF, a protocol error, or `shutdown`
/// fires. Any pending requests still in the map when the loop exits are
/// failed with [`ClientError::CommunicationError`].
async fn reader_loop(
    reader: crate::transport::BoxedReader,
    pending: PendingMap,
    shutdown: CancellationToken,
    alive: Arc<AtomicBool>,
) {
    let mut buffered = BufReader::new(reader);

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = read_line(&mut buffered) => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("daemon connection closed (EOF)");
                break;
            }
            Err(e) => {
                warn!("reader task stopping after protocol error: {e}");
                break;
            }
        };

        let response: Response = match decode_line(&line) {
            Ok(response) => response,
            Err(e) => {
                warn!("dropping malformed response line: {e}");
                continue;
            }
        };

        if let Some(tx) = pending.lock().remove(&response.request_id()) {
            let _ = tx.send(Ok(response));
        }
    }

    alive.store(false, Ordering::Release);

    let mut pending = pending.lock();
    for (_, tx) in pending.drain() {
        let _ = tx.send(Err(ClientError::CommunicationError("connection closed".into())));
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
