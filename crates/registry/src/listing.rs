// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shaping `data` for list-type commands: tab-separated, scripted
//! (`-H -p -o`) output parsed into arrays of records whose field order
//! matches the `-o` property list.

use serde_json::{Map, Value};

/// Properties used for `zpool list -H -p -o ...`.
pub const ZPOOL_PROPS: &[&str] = &[
    "name", "size", "alloc", "free", "frag", "cap", "dedup", "health", "guid", "altroot", "bootfs",
    "cachefile", "comment", "failmode", "listsnapshots", "version", "readonly", "feature@encryption",
    "autotrim", "autoexpand", "autoreplace",
];

/// Properties used for `zfs list -t filesystem,volume -H -p -o ...`.
pub const ZFS_DATASET_PROPS: &[&str] = &[
    "name", "type", "used", "available", "referenced", "mountpoint", "quota", "reservation",
    "recordsize", "compression", "compressratio", "atime", "relatime", "readonly", "volsize",
    "volblocksize", "dedup", "encryption", "keystatus", "keyformat", "keylocation", "pbkdf2iters",
    "mounted", "origin", "creation", "logicalused", "logicalreferenced", "sync",
];

/// Properties used for `zfs list -t snapshot -H -p -o ...`.
pub const ZFS_SNAPSHOT_PROPS: &[&str] = &[
    "name", "used", "referenced", "creation", "defer_destroy", "userrefs", "logicalused", "logicalreferenced",
];

/// Parse tab-separated scripted `zfs`/`zpool` list output into an array of
/// `{prop: value}` objects. A row whose column count doesn't match
/// `props.len()` is logged and skipped rather than failing the whole
/// command.
pub fn parse_scripted_table(stdout: &str, props: &[&str]) -> Vec<Value> {
    let mut rows = Vec::new();
    for (line_num, line) in stdout.trim().lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let values: Vec<&str> = line.split('\t').collect();
        if values.len() != props.len() {
            tracing::warn!(
                line_num = line_num + 1,
                expected = props.len(),
                got = values.len(),
                line,
                "mismatched columns parsing scripted list output, skipping row"
            );
            continue;
        }
        let mut record = Map::with_capacity(props.len());
        for (prop, value) in props.iter().zip(values) {
            record.insert(prop.to_string(), Value::String(value.to_string()));
        }
        rows.push(Value::Object(record));
    }
    rows
}

#[cfg(test)]
#[path = "listing_tests.rs"]
mod tests;
