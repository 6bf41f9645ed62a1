// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const SAMPLE: &str = r#"{
  "pools": {
    "tank": {
      "name": "tank",
      "state": "ONLINE",
      "error_count": "0",
      "vdevs": {
        "root-0": {
          "name": "root",
          "vdev_type": "root",
          "state": "ONLINE",
          "vdevs": {
            "mirror-0": {
              "name": "mirror-0",
              "vdev_type": "mirror",
              "state": "ONLINE",
              "vdevs": {
                "sda": {
                  "name": "sda",
                  "vdev_type": "disk",
                  "state": "ONLINE",
                  "path": "/dev/sda",
                  "read_errors": "0",
                  "write_errors": "0",
                  "checksum_errors": "0"
                },
                "sdb": {
                  "name": "sdb",
                  "vdev_type": "disk",
                  "state": "ONLINE",
                  "path": "/dev/sdb",
                  "read_errors": "0",
                  "write_errors": "0",
                  "checksum_errors": "0"
                }
              }
            }
          }
        }
      }
    }
  }
}"#;

#[test]
fn parses_single_pool_with_mirror() {
    let pools = parse_status_json(SAMPLE, None).unwrap();
    assert_eq!(pools.len(), 1);
    let pool = &pools[0];
    assert_eq!(pool.name, "tank");
    assert_eq!(pool.state, "ONLINE");
    assert_eq!(pool.vdev_tree.kind, VdevKind::Root);
    assert_eq!(pool.vdev_tree.children.len(), 1);
    let mirror = &pool.vdev_tree.children[0];
    assert_eq!(mirror.kind, VdevKind::Mirror);
    assert!(mirror.path.is_none());
    assert_eq!(mirror.children.len(), 2);
    for leaf in &mirror.children {
        assert!(leaf.is_leaf());
        assert!(leaf.path.is_some());
    }
}

#[test]
fn pool_name_filter_excludes_others() {
    let pools = parse_status_json(SAMPLE, Some("other")).unwrap();
    assert!(pools.is_empty());
}

#[test]
fn invalid_json_is_an_error() {
    assert!(parse_status_json("not json", None).is_err());
}

#[test]
fn empty_pools_object_yields_no_pools() {
    let pools = parse_status_json(r#"{"pools": {}}"#, None).unwrap();
    assert!(pools.is_empty());
}
