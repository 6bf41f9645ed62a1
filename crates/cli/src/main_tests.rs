// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn resolve_path_value_uses_canonical_default_when_bare() {
    let resolved = resolve_path_value("", 1000);
    assert_eq!(resolved, client_uds::canonical_socket_path(1000));
}

#[test]
fn resolve_path_value_uses_explicit_path_when_given() {
    let resolved = resolve_path_value("/tmp/custom.sock", 1000);
    assert_eq!(resolved, PathBuf::from("/tmp/custom.sock"));
}

#[test]
fn resolve_path_flag_is_none_when_absent() {
    assert_eq!(resolve_path_flag(&None, 1000), None);
}

#[test]
fn resolve_path_flag_resolves_present_value() {
    let raw = Some(String::new());
    assert_eq!(resolve_path_flag(&raw, 1000), Some(client_uds::canonical_socket_path(1000)));
}

#[test]
fn cli_rejects_daemon_flag_without_uid_gid() {
    let cli = Cli::parse_from(["zfdash", "--daemon"]);
    assert!(cli.daemon);
    assert!(cli.uid.is_none());
    assert!(cli.gid.is_none());
}

#[test]
fn cli_parses_listen_socket_with_explicit_path() {
    let cli = Cli::parse_from(["zfdash", "--daemon", "--uid", "1000", "--gid", "1000", "--listen-socket", "/tmp/x.sock"]);
    assert_eq!(cli.listen_socket.as_deref(), Some("/tmp/x.sock"));
}

#[test]
fn cli_parses_bare_listen_socket_flag() {
    let cli = Cli::parse_from(["zfdash", "--daemon", "--uid", "1000", "--gid", "1000", "--listen-socket"]);
    assert_eq!(cli.listen_socket.as_deref(), Some(""));
}
