// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Integration-style tests exercising `framing` together with the frame
//! types, the way a transport actually uses them: encode, push through an
//! in-memory pipe, decode.

use crate::{read_line, write_line, Request, Response};
use tokio::io::{AsyncWriteExt, BufReader};

#[tokio::test]
async fn request_round_trips_over_a_duplex_pipe() {
    let (mut client, server) = tokio::io::duplex(4096);
    let mut server_reader = BufReader::new(server);

    let req = Request::new("pool_status", 42);
    let line = serde_json::to_string(&req).unwrap();
    write_line(&mut client, &line).await.unwrap();

    let received = read_line(&mut server_reader).await.unwrap().unwrap();
    let decoded: Request = serde_json::from_str(&received).unwrap();
    assert_eq!(decoded, req);
}

#[tokio::test]
async fn response_round_trips_over_a_duplex_pipe() {
    let (client, mut server) = tokio::io::duplex(4096);
    let mut client_reader = BufReader::new(client);

    let resp = Response::success(42, serde_json::json!({"state": "ONLINE"}));
    let line = serde_json::to_string(&resp).unwrap();
    write_line(&mut server, &line).await.unwrap();

    let received = read_line(&mut client_reader).await.unwrap().unwrap();
    let decoded: Response = serde_json::from_str(&received).unwrap();
    assert_eq!(decoded, resp);
}

#[tokio::test]
async fn multiple_frames_on_one_connection_are_read_in_order() {
    let (mut client, server) = tokio::io::duplex(8192);
    let mut server_reader = BufReader::new(server);

    for i in 0..5u64 {
        let req = Request::new("pool_list", i);
        let line = serde_json::to_string(&req).unwrap();
        write_line(&mut client, &line).await.unwrap();
    }
    client.shutdown().await.unwrap();

    for i in 0..5u64 {
        let line = read_line(&mut server_reader).await.unwrap().unwrap();
        let decoded: Request = serde_json::from_str(&line).unwrap();
        assert_eq!(decoded.meta.request_id, i);
    }
    assert!(read_line(&mut server_reader).await.unwrap().is_none());
}

#[tokio::test]
async fn clean_eof_with_no_bytes_returns_none() {
    let (client, server) = tokio::io::duplex(64);
    drop(client);
    let mut server_reader = BufReader::new(server);
    assert!(read_line(&mut server_reader).await.unwrap().is_none());
}
