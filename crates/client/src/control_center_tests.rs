// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use tempfile::tempdir;

use super::*;
use crate::transport::Connection;

/// A runtime backed by an in-memory duplex pipe, standing in for a local
/// daemon connection. Keeping `_remote_end` alive prevents the reader task
/// from observing EOF during the test.
async fn local_runtime() -> (Arc<ClientRuntime>, tokio::io::DuplexStream) {
    let (local_end, remote_end) = tokio::io::duplex(4096);
    let (reader, writer) = crate::transport::split_boxed(local_end);
    let conn = Connection { reader, writer, owns_daemon: false, tls_active: false, child: None };
    (Arc::new(ClientRuntime::spawn(conn)), remote_end)
}

#[tokio::test]
async fn add_connection_persists_and_rejects_duplicate() {
    let dir = tempdir().unwrap();
    let (local, _keepalive) = local_runtime().await;
    let cc = ControlCenterManager::new(dir.path().to_path_buf(), local);

    cc.add_connection("office", "10.0.0.5", 8443, true).await.unwrap();
    let records = cc.list_connections().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].alias, "office");

    let err = cc.add_connection("office", "10.0.0.6", 8443, true).await.unwrap_err();
    assert!(matches!(err, ClientError::CommunicationError(_)));
}

#[tokio::test]
async fn remove_connection_clears_registry_and_trust_entry() {
    let dir = tempdir().unwrap();
    let (local, _keepalive) = local_runtime().await;
    let cc = ControlCenterManager::new(dir.path().to_path_buf(), local);

    cc.add_connection("office", "10.0.0.5", 8443, true).await.unwrap();
    trust_store::save(
        dir.path(),
        "10.0.0.5:8443",
        &zfdash_core::trust::TrustedCertificate {
            fingerprint: "deadbeef".into(),
            first_seen_epoch_ms: 0,
            last_verified_epoch_ms: 0,
        },
    )
    .unwrap();

    cc.remove_connection("office").await.unwrap();

    assert!(cc.list_connections().await.unwrap().is_empty());
    assert!(trust_store::load(dir.path()).unwrap().is_empty());
}

#[tokio::test]
async fn switch_active_rejects_unconnected_alias() {
    let dir = tempdir().unwrap();
    let (local, _keepalive) = local_runtime().await;
    let cc = ControlCenterManager::new(dir.path().to_path_buf(), local);

    cc.add_connection("office", "10.0.0.5", 8443, true).await.unwrap();
    let err = cc.switch_active("office").await.unwrap_err();
    assert!(matches!(err, ClientError::CommunicationError(_)));
}

#[tokio::test]
async fn dead_active_remote_never_falls_back_to_local() {
    let dir = tempdir().unwrap();
    let (local, _local_keepalive) = local_runtime().await;
    let cc = ControlCenterManager::new(dir.path().to_path_buf(), local);

    cc.add_connection("office", "10.0.0.5", 8443, true).await.unwrap();
    let (remote, remote_end) = local_runtime().await;
    cc.agents.lock().await.insert("office".to_string(), ConnectedAgent { runtime: remote });
    cc.switch_active("office").await.unwrap();

    // Drop the remote's peer end so the reader task observes EOF and
    // marks the runtime unhealthy.
    drop(remote_end);
    for _ in 0..100 {
        if !cc.agents.lock().await.get("office").unwrap().runtime.is_healthy() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    assert!(cc.get_active_client().await.is_none(), "a dead active remote must never fall back to the local daemon");
}

#[tokio::test]
async fn switch_active_local_selects_local_client() {
    let dir = tempdir().unwrap();
    let (local, _keepalive) = local_runtime().await;
    let cc = ControlCenterManager::new(dir.path().to_path_buf(), Arc::clone(&local));

    cc.switch_active(LOCAL_ALIAS).await.unwrap();
    let (healthy, alias) = cc.is_healthy_or_clear().await;
    assert!(healthy);
    assert_eq!(alias, None);

    let active = cc.get_active_client().await.unwrap();
    assert!(Arc::ptr_eq(&active, &local));
}
