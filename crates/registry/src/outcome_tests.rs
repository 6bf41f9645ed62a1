// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn mount_accepts_already_mounted() {
    assert!(is_benign("mount", "filesystem already mounted"));
}

#[test]
fn mount_accepts_keystore_mention() {
    assert!(is_benign("mount", "cannot mount: encryption keystore not loaded"));
}

#[test]
fn mount_rejects_unrelated_failure() {
    assert!(!is_benign("mount", "no such pool or dataset"));
}

#[test]
fn unmount_accepts_not_mounted() {
    assert!(is_benign("unmount", "cannot unmount: not mounted"));
}

#[test]
fn load_key_accepts_already_loaded() {
    assert!(is_benign("load-key", "Key already loaded for 'tank/data'.".to_lowercase().as_str()));
}

#[test]
fn unload_key_accepts_not_encrypted() {
    assert!(is_benign("unload-key", "cannot unload key: dataset is not encrypted"));
}

#[test]
fn import_list_accepts_no_pools_available() {
    assert!(is_benign("import-l", "no pools available for import"));
}

#[test]
fn remove_accepts_busy_or_io_error() {
    assert!(is_benign("remove", "device is busy"));
    assert!(is_benign("remove", "i/o error"));
}

#[test]
fn unknown_command_has_no_benign_entries() {
    assert!(!is_benign("destroy", "anything at all"));
}

#[test]
fn table_has_exactly_the_six_commands_spec_names() {
    let names: Vec<&str> = BENIGN_STDERR_TABLE.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, vec!["mount", "unmount", "load-key", "unload-key", "import-l", "remove"]);
}
