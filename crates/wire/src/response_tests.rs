// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn success_serializes_with_status_tag() {
    let resp = Response::success(1, serde_json::json!({"pools": []}));
    let json = serde_json::to_string(&resp).unwrap();
    assert!(json.contains("\"status\":\"success\""));
    assert!(json.contains("\"pools\""));
}

#[test]
fn success_without_data_omits_data_field() {
    let resp = Response::success(1, None);
    let json = serde_json::to_string(&resp).unwrap();
    assert!(!json.contains("\"data\""));
}

#[test]
fn error_serializes_with_status_tag_and_message() {
    let resp = Response::error(2, "pool not found", None);
    let json = serde_json::to_string(&resp).unwrap();
    assert!(json.contains("\"status\":\"error\""));
    assert!(json.contains("\"error\":\"pool not found\""));
    assert!(!json.contains("\"details\""));
}

#[test]
fn request_id_and_is_success_reflect_variant() {
    let ok = Response::success(9, None);
    let err = Response::error(9, "boom", Some("trace".to_string()));
    assert_eq!(ok.request_id(), 9);
    assert_eq!(err.request_id(), 9);
    assert!(ok.is_success());
    assert!(!err.is_success());
}

#[test]
fn round_trips_through_json() {
    let resp = Response::error(4, "denied", Some("not authorized".to_string()));
    let json = serde_json::to_string(&resp).unwrap();
    let back: Response = serde_json::from_str(&json).unwrap();
    assert_eq!(resp, back);
}
