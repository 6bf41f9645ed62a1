// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

// scenario S6.
const MIXED_INDENT: &str = "
  pool: tank
 state: ONLINE
config:

\tNAME        STATE     READ WRITE CKSUM
\ttank        ONLINE       0     0     0
\t  mirror-0  ONLINE       0     0     0
\t    /dev/sda  ONLINE     0     0     0
\t    /dev/sdb  ONLINE     0     0     0
\t  logs
\t    /dev/sdc  ONLINE     0     0     0

errors: No known data errors
";

#[test]
fn mixed_indentation_produces_mirror_and_logs_children() {
    let pools = parse_status_text(MIXED_INDENT, None);
    assert_eq!(pools.len(), 1);
    let pool = &pools[0];
    assert_eq!(pool.name, "tank");
    assert_eq!(pool.state, "ONLINE");
    assert_eq!(pool.vdev_tree.kind, VdevKind::Root);
    assert_eq!(pool.vdev_tree.children.len(), 2);

    let mirror = &pool.vdev_tree.children[0];
    assert_eq!(mirror.name, "mirror-0");
    assert_eq!(mirror.kind, VdevKind::Mirror);
    assert!(mirror.path.is_none());
    assert_eq!(mirror.children.len(), 2);
    assert_eq!(mirror.children[0].path.as_deref(), Some("/dev/sda"));
    assert_eq!(mirror.children[1].path.as_deref(), Some("/dev/sdb"));

    let logs = &pool.vdev_tree.children[1];
    assert_eq!(logs.kind, VdevKind::Log);
    assert_eq!(logs.children.len(), 1);
    assert_eq!(logs.children[0].path.as_deref(), Some("/dev/sdc"));
}

#[test]
fn unparseable_header_lines_are_ignored() {
    let text = "
  pool: tank
 state: ONLINE
scan: scrub repaired 0B in 00:00:01 with 0 errors on Mon Jan  1 00:00:00 2026
config:

\tNAME        STATE     READ WRITE CKSUM
\ttank        ONLINE       0     0     0

errors: No known data errors
";
    let pools = parse_status_text(text, None);
    assert_eq!(pools.len(), 1);
    assert_eq!(pools[0].vdev_tree.children.len(), 0);
}

#[test]
fn pool_name_filter_selects_one_of_several() {
    let text = "
  pool: tank
 state: ONLINE
config:

\ttank        ONLINE       0     0     0

errors: No known data errors

  pool: backup
 state: DEGRADED
config:

\tbackup      DEGRADED     0     0     0

errors: No known data errors
";
    let pools = parse_status_text(text, Some("backup"));
    assert_eq!(pools.len(), 1);
    assert_eq!(pools[0].name, "backup");
    assert_eq!(pools[0].state, "DEGRADED");
}

#[test]
fn empty_input_yields_no_pools() {
    assert!(parse_status_text("", None).is_empty());
}

#[test]
fn single_disk_vdev_with_no_grouping() {
    let text = "
  pool: tank
 state: ONLINE
config:

\tNAME        STATE     READ WRITE CKSUM
\ttank        ONLINE       0     0     0
\t  /dev/sda  ONLINE       0     0     0

errors: No known data errors
";
    let pools = parse_status_text(text, None);
    let root = &pools[0].vdev_tree;
    assert_eq!(root.children.len(), 1);
    assert_eq!(root.children[0].kind, VdevKind::Disk);
    assert_eq!(root.children[0].path.as_deref(), Some("/dev/sda"));
}
