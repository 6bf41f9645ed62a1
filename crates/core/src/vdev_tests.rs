// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn kind_from_name_recognizes_raidz_levels() {
    assert_eq!(VdevKind::from_name("raidz1-0"), VdevKind::Raidz1);
    assert_eq!(VdevKind::from_name("raidz2-0"), VdevKind::Raidz2);
    assert_eq!(VdevKind::from_name("raidz3-0"), VdevKind::Raidz3);
    assert_eq!(VdevKind::from_name("raidz-0"), VdevKind::Raidz);
}

#[test]
fn kind_from_name_recognizes_group_headers() {
    assert_eq!(VdevKind::from_name("logs"), VdevKind::Log);
    assert_eq!(VdevKind::from_name("cache"), VdevKind::Cache);
    assert_eq!(VdevKind::from_name("spares"), VdevKind::Spare);
    assert_eq!(VdevKind::from_name("special"), VdevKind::Special);
}

#[test]
fn kind_from_name_falls_back_to_unknown() {
    assert_eq!(
        VdevKind::from_name("bogus-vdev"),
        VdevKind::Unknown("bogus-vdev".to_string())
    );
}

#[test]
fn kind_from_json_tag_matches_spec_literal_list() {
    assert_eq!(VdevKind::from_json_tag("raidz2"), VdevKind::Raidz2);
    assert_eq!(VdevKind::from_json_tag("dedup"), VdevKind::Dedup);
    assert_eq!(VdevKind::from_json_tag("disk"), VdevKind::Disk);
    assert_eq!(
        VdevKind::from_json_tag("something_new"),
        VdevKind::Unknown("something_new".to_string())
    );
}

#[test]
fn min_devices_matches_spec_table() {
    assert_eq!(VdevKind::Mirror.min_devices(), 2);
    assert_eq!(VdevKind::Special.min_devices(), 2);
    assert_eq!(VdevKind::Dedup.min_devices(), 2);
    assert_eq!(VdevKind::Raidz1.min_devices(), 3);
    assert_eq!(VdevKind::Raidz2.min_devices(), 4);
    assert_eq!(VdevKind::Raidz3.min_devices(), 5);
    assert_eq!(VdevKind::Disk.min_devices(), 1);
}

#[test]
fn state_parse_keeps_unrecognized_strings_instead_of_guessing() {
    assert_eq!(VdevState::parse("ONLINE"), VdevState::Online);
    assert_eq!(
        VdevState::parse("bogus"),
        VdevState::Unknown("bogus".to_string())
    );
}

fn leaf(name: &str) -> VdevNode {
    VdevNode {
        name: name.to_string(),
        kind: VdevKind::Disk,
        state: VdevState::Online,
        read_errors: "0".to_string(),
        write_errors: "0".to_string(),
        checksum_errors: "0".to_string(),
        path: Some(format!("/dev/{name}")),
        children: vec![],
    }
}

fn group(name: &str, kind: VdevKind, children: Vec<VdevNode>) -> VdevNode {
    VdevNode {
        name: name.to_string(),
        kind,
        state: VdevState::Online,
        read_errors: "0".to_string(),
        write_errors: "0".to_string(),
        checksum_errors: "0".to_string(),
        path: None,
        children,
    }
}

#[test]
fn leaf_count_counts_only_terminal_nodes() {
    let mirror = group("mirror-0", VdevKind::Mirror, vec![leaf("sda"), leaf("sdb")]);
    assert_eq!(mirror.leaf_count(), 2);
}

#[test]
fn is_leaf_reflects_children_emptiness() {
    assert!(leaf("sda").is_leaf());
    assert!(!group("mirror-0", VdevKind::Mirror, vec![leaf("sda")]).is_leaf());
}

#[test]
fn iter_visits_every_node_exactly_once() {
    let tree = group(
        "tank",
        VdevKind::Root,
        vec![
            group("mirror-0", VdevKind::Mirror, vec![leaf("sda"), leaf("sdb")]),
            group("logs", VdevKind::Log, vec![leaf("sdc")]),
        ],
    );
    let names: Vec<&str> = tree.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names.len(), 5);
    assert!(names.contains(&"tank"));
    assert!(names.contains(&"sda"));
    assert!(names.contains(&"sdc"));
}
