// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn negative_uid_maps_to_fallback_dir() {
    assert_eq!(user_runtime_dir(-1), PathBuf::from("/tmp"));
}

#[test]
fn same_uid_resolves_to_same_path_repeatedly() {
    let a = user_runtime_dir(65_500);
    let b = user_runtime_dir(65_500);
    assert_eq!(a, b);
}

#[test]
fn distinct_uids_resolve_to_distinct_paths() {
    let a = user_runtime_dir(65_501);
    let b = user_runtime_dir(65_502);
    assert_ne!(a, b);
}
