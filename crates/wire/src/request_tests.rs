// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_request_has_empty_args_and_kwargs() {
    let req = Request::new("pool_list", 7);
    assert_eq!(req.command, "pool_list");
    assert!(req.args.is_empty());
    assert!(req.kwargs.is_empty());
    assert_eq!(req.meta.request_id, 7);
    assert_eq!(req.meta.user_uid, -1);
    assert!(!req.meta.log_enabled);
}

#[test]
fn missing_meta_fields_default_on_deserialize() {
    let json = r#"{"command":"pool_list","meta":{"request_id":3}}"#;
    let req: Request = serde_json::from_str(json).unwrap();
    assert_eq!(req.meta.user_uid, -1);
    assert!(!req.meta.log_enabled);
    assert!(req.args.is_empty());
    assert!(req.kwargs.is_empty());
}

#[test]
fn with_kwargs_round_trips() {
    let mut kwargs = serde_json::Map::new();
    kwargs.insert("name".to_string(), serde_json::json!("tank"));
    let req = Request::new("pool_destroy", 1).with_kwargs(kwargs.clone());
    let json = serde_json::to_string(&req).unwrap();
    let back: Request = serde_json::from_str(&json).unwrap();
    assert_eq!(back.kwargs, kwargs);
}
