// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Black-box tests driving the compiled `zfdash` binary over its real
//! transports: spawn the binary as a subprocess, talk to it only
//! over the wire protocol, never call into any crate's internals.
//!
//! Agent-mode (TLS/TOFU/auth) scenarios are intentionally not exercised
//! here: they need a populated credential store at the daemon's fixed
//! system path, which an unprivileged test run cannot safely provide.
//! Those properties are covered by `zfdash-daemon::tls`,
//! `zfdash-client::transport::tls`, and `zfdash-client::trust_store`'s own
//! colocated unit tests instead.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use serde_json::Map;
use tempfile::tempdir;

use zfdash_client::{handshake, transport::uds, ClientRuntime};
use zfdash_wire::{decode_line, encode_line, read_line, write_line, Request, Response};

fn zfdash_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("zfdash")
}

fn current_uid_gid() -> (u32, u32) {
    (nix::unistd::getuid().as_raw(), nix::unistd::getgid().as_raw())
}

/// Owns a spawned `zfdash --daemon` child, killing it on drop so a failed
/// assertion never leaks a background process across test runs.
struct DaemonGuard {
    child: Child,
}

impl DaemonGuard {
    fn spawn_uds(socket: &Path) -> Self {
        let (uid, gid) = current_uid_gid();
        let child = Command::new(zfdash_bin())
            .args([
                "--daemon",
                "--uid",
                &uid.to_string(),
                "--gid",
                &gid.to_string(),
                "--listen-socket",
                socket.to_str().expect("socket path is valid UTF-8"),
            ])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn zfdash --daemon");
        Self { child }
    }
}

impl Drop for DaemonGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

async fn wait_for_socket(path: &Path) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        if tokio::net::UnixStream::connect(path).await.is_ok() {
            return;
        }
        assert!(tokio::time::Instant::now() < deadline, "daemon never bound {}", path.display());
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

async fn connect_runtime(path: &Path) -> ClientRuntime {
    let mut conn = uds::connect(path).await.expect("connect to daemon socket");
    handshake::wait_for_ready(&mut conn.reader).await.expect("daemon ready line");
    ClientRuntime::spawn(conn)
}

/// `shutdown_daemon`'s success response must reach the client before
/// the daemon tears the connection down: no response is ever lost to a
/// race between writing it and closing the socket.
#[tokio::test(flavor = "multi_thread")]
async fn shutdown_daemon_is_acknowledged_before_connection_closes() {
    let dir = tempdir().unwrap();
    let socket = dir.path().join("zfdash.sock");
    let _daemon = DaemonGuard::spawn_uds(&socket);
    wait_for_socket(&socket).await;

    let mut conn = uds::connect(&socket).await.unwrap();
    handshake::wait_for_ready(&mut conn.reader).await.unwrap();

    let request = Request::new("shutdown_daemon", 42);
    let line = encode_line(&request).unwrap();
    write_line(&mut conn.writer, &line).await.unwrap();

    let mut buffered = tokio::io::BufReader::new(&mut conn.reader);
    let response_line = tokio::time::timeout(Duration::from_secs(5), read_line(&mut buffered))
        .await
        .expect("daemon should reply before the timeout")
        .unwrap()
        .expect("daemon should send a response line, not an immediate EOF");
    let response: Response = decode_line(&response_line).unwrap();
    assert_eq!(response.request_id(), 42);
    assert!(response.is_success(), "shutdown_daemon should succeed: {response:?}");

    let next = tokio::time::timeout(Duration::from_secs(5), read_line(&mut buffered))
        .await
        .expect("daemon should close the connection promptly after shutdown")
        .unwrap();
    assert!(next.is_none(), "connection should hit EOF once the daemon has torn down");
}

/// Every concurrently in-flight request must come back on the
/// connection it was asked on, correlated by `request_id`, regardless of
/// completion order.
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_requests_are_correctly_correlated() {
    let dir = tempdir().unwrap();
    let socket = dir.path().join("zfdash.sock");
    let _daemon = DaemonGuard::spawn_uds(&socket);
    wait_for_socket(&socket).await;

    let runtime = std::sync::Arc::new(connect_runtime(&socket).await);

    let mut handles = Vec::new();
    for _ in 0..40 {
        let runtime = std::sync::Arc::clone(&runtime);
        handles.push(tokio::spawn(async move { runtime.request("get_pool_status", Map::new()).await }));
    }
    for _ in 0..10 {
        let runtime = std::sync::Arc::clone(&runtime);
        handles.push(tokio::spawn(async move { runtime.request("list_pools", Map::new()).await }));
    }

    let mut seen_ids = std::collections::HashSet::new();
    for handle in handles {
        let response = handle.await.unwrap().expect("request should not time out");
        // Whether or not `zpool`/`zfs` exist in this environment, a
        // response must arrive and carry a request_id this runtime
        // actually issued; correlation, not command success, is under
        // test here.
        assert!(seen_ids.insert(response.request_id()), "duplicate request_id delivered: {response:?}");
    }
    assert_eq!(seen_ids.len(), 50);

    runtime.close().await.unwrap();
}

/// A second daemon bound to the same socket path must fail to start, and
/// must not disturb the first daemon's listener (grounded on
/// `zfdash-daemon::listener::uds`'s `bind_refuses_when_already_running`
/// unit test, exercised here end-to-end across two real processes).
#[tokio::test(flavor = "multi_thread")]
async fn second_daemon_on_same_socket_does_not_kill_the_first() {
    let dir = tempdir().unwrap();
    let socket = dir.path().join("zfdash.sock");
    let _first = DaemonGuard::spawn_uds(&socket);
    wait_for_socket(&socket).await;

    let (uid, gid) = current_uid_gid();
    let second = Command::new(zfdash_bin())
        .args([
            "--daemon",
            "--uid",
            &uid.to_string(),
            "--gid",
            &gid.to_string(),
            "--listen-socket",
            socket.to_str().unwrap(),
        ])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("run second zfdash --daemon");
    assert!(!second.success(), "second daemon on a live socket should exit non-zero");

    // The first daemon must still be reachable and still answer requests.
    let runtime = connect_runtime(&socket).await;
    let response = runtime.request("get_pool_status", Map::new()).await.unwrap();
    assert_eq!(response.request_id(), 1);
    runtime.close().await.unwrap();
}

/// `zfdash --stop-daemon` must actually terminate a running UDS daemon.
#[tokio::test(flavor = "multi_thread")]
async fn stop_daemon_flag_shuts_down_a_running_daemon() {
    let dir = tempdir().unwrap();
    let socket = dir.path().join("zfdash.sock");
    let daemon = DaemonGuard::spawn_uds(&socket);
    wait_for_socket(&socket).await;

    let (uid, gid) = current_uid_gid();
    let status = Command::new(zfdash_bin())
        .args(["--stop-daemon", socket.to_str().unwrap(), "--uid", &uid.to_string(), "--gid", &gid.to_string()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("run zfdash --stop-daemon");
    assert!(status.success(), "--stop-daemon should report success");

    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        if tokio::net::UnixStream::connect(&socket).await.is_err() {
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "daemon never went away after --stop-daemon");
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    drop(daemon);
}

/// An unknown command gets a well-formed error response, never a dropped
/// connection or a hang — the protocol must stay well-formed even when
/// the underlying `zpool`/`zfs` tooling this environment has no opinion
/// about is absent.
#[tokio::test(flavor = "multi_thread")]
async fn unknown_command_yields_a_well_formed_error_response() {
    let dir = tempdir().unwrap();
    let socket = dir.path().join("zfdash.sock");
    let _daemon = DaemonGuard::spawn_uds(&socket);
    wait_for_socket(&socket).await;

    let runtime = connect_runtime(&socket).await;
    let response = runtime.request("this_command_does_not_exist", Map::new()).await.unwrap();
    assert!(!response.is_success());
    if let Response::Error { error, .. } = &response {
        assert!(!error.is_empty());
    } else {
        panic!("expected an error response, got {response:?}");
    }
    runtime.close().await.unwrap();
}
