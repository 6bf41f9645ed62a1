// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

use serde_json::json;
use serial_test::serial;
use zfdash_wire::Response;

fn harness() -> (ClientRuntime, tokio::io::DuplexStream) {
    let (client_side, server_side) = tokio::io::duplex(8192);
    let (reader, writer) = tokio::io::split(client_side);
    let conn = Connection { reader: Box::new(reader), writer: Box::new(writer), owns_daemon: false, tls_active: false, child: None };
    (ClientRuntime::spawn(conn), server_side)
}

#[tokio::test]
async fn request_round_trip_delivers_matching_response() {
    let (runtime, server) = harness();
    let mut server = BufReader::new(server);

    let server_task = tokio::spawn(async move {
        let line = read_line(&mut server).await.unwrap().unwrap();
        let req: Request = decode_line(&line).unwrap();
        assert_eq!(req.command, "list_pools");

        let response = Response::success(req.meta.request_id, json!({"pools": []}));
        let line = encode_line(&response).unwrap();
        write_line(server.get_mut(), &line).await.unwrap();
        server
    });

    let response = runtime.request("list_pools", Map::new()).await.unwrap();
    assert!(response.is_success());

    server_task.await.unwrap();
}

#[tokio::test]
async fn out_of_order_responses_reach_the_right_caller() {
    let (runtime, server) = harness();
    let runtime = Arc::new(runtime);
    let mut server = BufReader::new(server);

    let server_task = tokio::spawn(async move {
        let mut requests = Vec::new();
        for _ in 0..2 {
            let line = read_line(&mut server).await.unwrap().unwrap();
            let req: Request = decode_line(&line).unwrap();
            requests.push(req);
        }
        // Reply in reverse order of arrival.
        for req in requests.into_iter().rev() {
            let data = json!({"echo": req.command});
            let response = Response::success(req.meta.request_id, data);
            let line = encode_line(&response).unwrap();
            write_line(server.get_mut(), &line).await.unwrap();
        }
    });

    let r1 = runtime.request("list_pools", Map::new());
    let r2 = runtime.request("list_datasets", Map::new());
    let (resp1, resp2) = tokio::join!(r1, r2);
    let resp1 = resp1.unwrap();
    let resp2 = resp2.unwrap();

    match resp1 {
        Response::Success { data, .. } => assert_eq!(data.unwrap()["echo"], "list_pools"),
        _ => panic!("expected success"),
    }
    match resp2 {
        Response::Success { data, .. } => assert_eq!(data.unwrap()["echo"], "list_datasets"),
        _ => panic!("expected success"),
    }

    server_task.await.unwrap();
}

#[tokio::test]
#[serial]
async fn request_times_out_when_daemon_never_replies() {
    std::env::set_var("ZFDASH_CLIENT_REQUEST_TIMEOUT_MS", "50");
    let (runtime, _server) = harness();

    let err = runtime.request("list_pools", Map::new()).await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout(_)));

    std::env::remove_var("ZFDASH_CLIENT_REQUEST_TIMEOUT_MS");
}

#[tokio::test]
async fn disconnect_fails_pending_requests() {
    let (runtime, server) = harness();
    let runtime = Arc::new(runtime);

    let pending = runtime.request("list_pools", Map::new());
    drop(server);

    let err = pending.await.unwrap_err();
    assert!(matches!(err, ClientError::CommunicationError(_)));
}
