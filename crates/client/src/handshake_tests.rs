// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use zfdash_wire::{write_line as wire_write_line, AuthErrorCode};

#[tokio::test]
async fn version_hello_plain_accept_returns_false() {
    let (mut client, mut server) = tokio::io::duplex(4096);
    let server_task = tokio::spawn(async move {
        let mut reader = tokio::io::BufReader::new(&mut server);
        let line = read_line(&mut reader).await.unwrap().unwrap();
        let hello: VersionHello = decode_line(&line).unwrap();
        assert!(!hello.tls);
        let action = HelloAction::plain_accept();
        wire_write_line(&mut server, &encode_line(&action).unwrap()).await.unwrap();
    });

    let tls = run_version_hello(&mut client, false).await.unwrap();
    assert!(!tls);
    server_task.await.unwrap();
}

#[tokio::test]
async fn version_hello_error_surfaces_tls_negotiation_error() {
    let (mut client, mut server) = tokio::io::duplex(4096);
    let server_task = tokio::spawn(async move {
        let mut reader = tokio::io::BufReader::new(&mut server);
        let _line = read_line(&mut reader).await.unwrap().unwrap();
        let action = HelloAction::error(TlsErrorCode::Required);
        wire_write_line(&mut server, &encode_line(&action).unwrap()).await.unwrap();
    });

    let err = run_version_hello(&mut client, false).await.unwrap_err();
    assert!(matches!(err, ClientError::TlsNegotiationError { code: TlsErrorCode::Required, .. }));
    server_task.await.unwrap();
}

#[tokio::test]
async fn auth_handshake_succeeds_with_matching_response() {
    let (mut client, mut server) = tokio::io::duplex(4096);
    let nonce = vec![1u8, 2, 3, 4];
    let expected = compute_auth_response("hunter2", &nonce).unwrap();

    let server_task = tokio::spawn(async move {
        let challenge = AuthChallenge { nonce: hex::encode(&nonce), timeout: 30 };
        wire_write_line(&mut server, &encode_line(&challenge).unwrap()).await.unwrap();

        let mut reader = tokio::io::BufReader::new(&mut server);
        let line = read_line(&mut reader).await.unwrap().unwrap();
        let response: AuthResponse = decode_line(&line).unwrap();
        assert_eq!(response.response, expected);

        let outcome = AuthOutcome::ok();
        wire_write_line(&mut server, &encode_line(&outcome).unwrap()).await.unwrap();
    });

    run_auth_handshake(&mut client, "hunter2").await.unwrap();
    server_task.await.unwrap();
}

#[tokio::test]
async fn auth_handshake_propagates_server_rejection() {
    let (mut client, mut server) = tokio::io::duplex(4096);
    let server_task = tokio::spawn(async move {
        let challenge = AuthChallenge { nonce: hex::encode([1, 2, 3]), timeout: 30 };
        wire_write_line(&mut server, &encode_line(&challenge).unwrap()).await.unwrap();

        let mut reader = tokio::io::BufReader::new(&mut server);
        let _line = read_line(&mut reader).await.unwrap().unwrap();

        let outcome = AuthOutcome::error(AuthErrorCode::AuthFailed);
        wire_write_line(&mut server, &encode_line(&outcome).unwrap()).await.unwrap();
    });

    let err = run_auth_handshake(&mut client, "wrong").await.unwrap_err();
    assert!(matches!(err, ClientError::AuthError(_)));
    server_task.await.unwrap();
}

#[tokio::test]
async fn wait_for_ready_accepts_ready_line() {
    let (mut client, mut server) = tokio::io::duplex(4096);
    let server_task = tokio::spawn(async move {
        wire_write_line(&mut server, &encode_line(&Ready::default()).unwrap()).await.unwrap();
    });

    wait_for_ready(&mut client).await.unwrap();
    server_task.await.unwrap();
}
