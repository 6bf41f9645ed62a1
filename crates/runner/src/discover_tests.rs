// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use std::os::unix::fs::PermissionsExt;

#[test]
#[serial(path_env)]
fn finds_executable_on_path() {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("fake-zpool");
    std::fs::write(&bin, "#!/bin/sh\nexit 0\n").unwrap();
    let mut perms = std::fs::metadata(&bin).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&bin, perms).unwrap();

    let old_path = std::env::var_os("PATH");
    std::env::set_var("PATH", dir.path());
    let found = discover_binary("fake-zpool");
    if let Some(p) = old_path {
        std::env::set_var("PATH", p);
    }

    assert_eq!(found.unwrap(), bin);
}

#[test]
fn missing_binary_reports_not_found() {
    let err = discover_binary("definitely-not-a-real-zfs-binary-xyz").unwrap_err();
    assert!(matches!(err, BinaryDiscoveryError::NotFound(_)));
}

#[test]
#[serial(path_env)]
fn non_executable_file_on_path_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("fake-zfs");
    std::fs::write(&bin, "not executable").unwrap();
    let mut perms = std::fs::metadata(&bin).unwrap().permissions();
    perms.set_mode(0o644);
    std::fs::set_permissions(&bin, perms).unwrap();

    let old_path = std::env::var_os("PATH");
    std::env::set_var("PATH", dir.path());
    let found = discover_binary("fake-zfs");
    if let Some(p) = old_path {
        std::env::set_var("PATH", p);
    }

    assert!(found.is_err());
}
