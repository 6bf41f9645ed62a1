// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The daemon dispatcher: per-connection read loop, a bounded worker pool
//! for everything except `shutdown_daemon`, and grace-period shutdown
//! coordination.
//!
//! One task owns the connection's reader; each request becomes a
//! short-lived task that writes its own reply through a cloneable,
//! mutex-guarded writer handle, so all writes to a connection go through
//! a single connection-level mutex and frames never interleave.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use zfdash_core::error::DaemonError;
use zfdash_registry::{Command, ExecCtx};
use zfdash_wire::{decode_line, encode_line, read_line, write_line, Ready, Request, Response};

use crate::builtin;
use crate::config::{DaemonConfig, TransportMode};
use crate::connection::{Connection, ConnectionWriter};
use crate::credential_store::CredentialStore;
use crate::env::{shutdown_drain_timeout, worker_pool_size};
use crate::listener::{pipe, tls as tls_listener, uds};

#[derive(Debug, Error)]
pub enum DaemonRunError {
    #[error(transparent)]
    Uds(#[from] uds::UdsListenError),

    #[error(transparent)]
    Agent(#[from] tls_listener::AgentListenError),

    #[error("failed to load TLS cert/key: {0}")]
    Cert(#[from] crate::cert::CertError),

    #[error("failed to configure TLS: {0}")]
    TlsSetup(#[from] crate::tls::TlsSetupError),
}

/// State threaded through every connection's worker tasks: no process-wide
/// singletons, just one struct built once in [`run`] and cheaply cloned
/// (it's all `Arc`s) into each spawned task.
#[derive(Clone)]
struct DispatchState {
    credentials: Arc<CredentialStore>,
    shutdown: CancellationToken,
    zpool_legacy_cache: Arc<tokio::sync::OnceCell<bool>>,
}

/// Run the daemon to completion: bind the configured transport, accept
/// connections, dispatch commands, and return once a clean shutdown has
/// drained all in-flight work.
pub async fn run(config: DaemonConfig) -> Result<(), DaemonRunError> {
    let credentials = Arc::new(CredentialStore::at_default_path());
    let shutdown = CancellationToken::new();
    let state = DispatchState {
        credentials,
        shutdown: shutdown.clone(),
        zpool_legacy_cache: Arc::new(tokio::sync::OnceCell::new()),
    };

    match &config.transport {
        TransportMode::Pipe => {
            info!("daemon starting in pipe mode");
            let conn = pipe::accept();
            send_ready(&conn).await;
            serve_connection(conn, state).await;
        }
        TransportMode::Uds { path } => {
            let path = path.clone().unwrap_or_else(|| crate::paths::canonical_socket_path(config.uid));
            let listener = uds::UdsListener::bind(&path, config.uid, config.gid).await?;
            info!(path = %path.display(), "daemon starting in socket mode");

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    accepted = listener.accept() => {
                        match accepted {
                            Ok(conn) => {
                                send_ready(&conn).await;
                                serve_connection(conn, state.clone()).await;
                            }
                            Err(e) => warn!("accept failed: {e}"),
                        }
                        if shutdown.is_cancelled() {
                            break;
                        }
                    }
                }
            }
        }
        TransportMode::Agent { port, use_tls } => {
            let tls_acceptor = if *use_tls {
                let pair = crate::cert::load_or_generate().await?;
                Some(crate::tls::acceptor_from(&pair)?)
            } else {
                None
            };
            if state.credentials.load().await.map(|e| e.is_empty()).unwrap_or(true) {
                warn!("agent mode has no credentials configured yet; change_password must be called before any client can authenticate");
            }
            let listener = tls_listener::AgentListener::bind(*port, tls_acceptor, Arc::clone(&state.credentials)).await?;
            info!(port, "daemon starting in agent mode");

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    accepted = listener.accept() => {
                        match accepted {
                            Ok(conn) => {
                                send_ready(&conn).await;
                                serve_connection(conn, state.clone()).await;
                            }
                            Err(e) => warn!("accept failed: {e}"),
                        }
                        if shutdown.is_cancelled() {
                            break;
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

async fn send_ready(conn: &Connection) {
    if let Ok(line) = encode_line(&Ready::default()) {
        if let Err(e) = conn.send_line(&line).await {
            warn!("failed to send ready signal: {e}");
        }
    }
}

/// Drive one connection's read loop to completion: parse each line,
/// handle `shutdown_daemon` synchronously, submit everything else to the
/// bounded worker pool.
async fn serve_connection(conn: Connection, state: DispatchState) {
    let writer = conn.writer_handle();
    let workers = TaskTracker::new();
    let permits = Arc::new(Semaphore::new(worker_pool_size()));
    let mut buffered = tokio::io::BufReader::new(conn.reader);

    loop {
        let line = tokio::select! {
            _ = state.shutdown.cancelled() => break,
            line = read_line(&mut buffered) => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("connection closed (EOF)");
                break;
            }
            Err(e) => {
                warn!("protocol error reading connection: {e}");
                break;
            }
        };

        let request: Request = match decode_line(&line) {
            Ok(r) => r,
            Err(e) => {
                warn!("dropping malformed request line: {e}");
                continue;
            }
        };

        if request.command == "shutdown_daemon" {
            info!(request_id = request.meta.request_id, "received shutdown_daemon, acknowledging before teardown");
            let response = Response::success(request.meta.request_id, Value::String("Daemon shutting down gracefully.".to_string()));
            if let Ok(line) = encode_line(&response) {
                let _ = writer.send_line(&line).await;
            }
            state.shutdown.cancel();
            break;
        }

        spawn_worker(request, writer.clone(), Arc::clone(&permits), state.clone(), &workers);
    }

    workers.close();
    let grace = shutdown_drain_timeout();
    if tokio::time::timeout(grace, workers.wait()).await.is_err() {
        warn!("worker drain exceeded {grace:?}, proceeding with shutdown anyway");
    }
}

fn spawn_worker(
    request: Request,
    writer: ConnectionWriter,
    permits: Arc<Semaphore>,
    state: DispatchState,
    workers: &TaskTracker,
) {
    workers.spawn(async move {
        let _permit = permits.acquire_owned().await;
        let request_id = request.meta.request_id;
        let response = handle_request(request, &state).await;
        let response = response.unwrap_or_else(|e| to_error_response(request_id, &e));
        match encode_line(&response) {
            Ok(line) => {
                if let Err(e) = writer.send_line(&line).await {
                    warn!(request_id, "failed to write response: {e}");
                }
            }
            Err(e) => warn!(request_id, "failed to encode response: {e}"),
        }
    });
}

async fn handle_request(request: Request, state: &DispatchState) -> Result<Response, DaemonError> {
    let ctx = ExecCtx::new(request.meta.log_enabled, request.meta.user_uid);
    let request_id = request.meta.request_id;

    if builtin::is_builtin(&request.command) {
        debug!(command = %request.command, request_id, "dispatching builtin command");
        let data = builtin::dispatch(&request.command, &request.kwargs, ctx, &state.credentials, &state.zpool_legacy_cache).await?;
        return Ok(Response::success(request_id, data));
    }

    if !Command::is_known(&request.command) {
        return Err(DaemonError::UnknownCommand(request.command.clone()));
    }

    let command = Command::from_envelope(&request.command, &request.kwargs)
        .map_err(DaemonError::from)?;

    info!(command = %request.command, request_id, "dispatching command");
    let data = command.dispatch(ctx).await.map_err(DaemonError::from)?;
    Ok(Response::success(request_id, data))
}

fn to_error_response(request_id: u64, error: &DaemonError) -> Response {
    Response::error(request_id, error.to_string(), error.details())
}

/// Synchronously request shutdown from a running socket-mode daemon, used
/// by `zfdash-cli --stop-daemon`. Connects, sends
/// `shutdown_daemon`, and waits briefly for the acknowledgement.
pub async fn send_stop_request(path: &std::path::Path) -> Result<(), std::io::Error> {
    use tokio::net::UnixStream;
    let mut stream = UnixStream::connect(path).await?;

    // Consume the daemon's ready line before sending a request.
    let mut reader = tokio::io::BufReader::new(&mut stream);
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), read_line(&mut reader)).await;

    let request = Request::new("shutdown_daemon", 1);
    if let Ok(line) = encode_line(&request) {
        let _ = write_line(&mut stream, &line).await;
    }
    let mut reader = tokio::io::BufReader::new(&mut stream);
    let _ = tokio::time::timeout(std::time::Duration::from_secs(10), read_line(&mut reader)).await;
    Ok(())
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
