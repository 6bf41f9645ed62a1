// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-mode parser for `zpool status -j -P`: decodes the command's JSON
//! output directly into the canonical vdev tree.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use zfdash_core::{PoolStatus, ScanState, ScanStats, VdevKind, VdevNode, VdevState};

use crate::ParseError;

#[derive(Debug, Deserialize)]
struct RawRoot {
    #[serde(default)]
    pools: BTreeMap<String, RawPool>,
}

#[derive(Debug, Deserialize)]
struct RawPool {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    scan_stats: Option<RawScanStats>,
    #[serde(default)]
    error_count: Option<Value>,
    #[serde(default)]
    vdevs: BTreeMap<String, RawVdev>,
}

#[derive(Debug, Deserialize)]
struct RawScanStats {
    #[serde(default)]
    function: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    percent_done: Option<f64>,
    #[serde(default)]
    bytes_scanned: Option<u64>,
    #[serde(default)]
    bytes_to_scan: Option<u64>,
    #[serde(default)]
    errors: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawVdev {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    vdev_type: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    read_errors: Option<Value>,
    #[serde(default)]
    write_errors: Option<Value>,
    #[serde(default)]
    checksum_errors: Option<Value>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    vdevs: BTreeMap<String, RawVdev>,
}

fn value_to_counter_string(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "0".to_string(),
    }
}

/// Parse `zpool status -j -P [pool_name]` stdout into one `PoolStatus` per
/// pool present (filtered to `pool_name` when given, matching the
/// original's "extract just that pool, else all" behavior).
pub fn parse_status_json(
    raw_output: &str,
    pool_name: Option<&str>,
) -> Result<Vec<PoolStatus>, ParseError> {
    let root: RawRoot =
        serde_json::from_str(raw_output).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    let mut out = Vec::new();
    for (key, pool) in &root.pools {
        if let Some(filter) = pool_name {
            if filter != key {
                continue;
            }
        }
        out.push(convert_pool(key, pool));
    }
    Ok(out)
}

fn convert_pool(key: &str, pool: &RawPool) -> PoolStatus {
    let scan = pool.scan_stats.as_ref().map(convert_scan);
    let vdev_tree = build_vdev_tree(&pool.vdevs);
    PoolStatus {
        name: pool.name.clone().unwrap_or_else(|| key.to_string()),
        state: pool.state.clone().unwrap_or_else(|| "UNKNOWN".to_string()),
        scan,
        errors: value_to_counter_string(pool.error_count.as_ref()),
        vdev_tree,
    }
}

fn convert_scan(raw: &RawScanStats) -> ScanStats {
    let state = match raw.state.as_deref() {
        Some("SCANNING") => ScanState::Scanning,
        Some("FINISHED") => ScanState::Finished,
        Some("CANCELED") => ScanState::Canceled,
        _ => ScanState::None,
    };
    ScanStats {
        state,
        function: raw.function.clone(),
        percent_done: raw.percent_done,
        bytes_scanned: raw.bytes_scanned,
        bytes_to_scan: raw.bytes_to_scan,
        errors: raw.errors,
    }
}

/// Mirrors `_parse_vdev_tree`: a single top-level key becomes the root
/// directly; multiple top-level keys (unusual, but the original tolerates
/// it) are wrapped in a synthetic `root` node.
fn build_vdev_tree(vdevs: &BTreeMap<String, RawVdev>) -> VdevNode {
    if vdevs.is_empty() {
        return VdevNode {
            name: "root".to_string(),
            kind: VdevKind::Root,
            state: VdevState::Unknown(String::new()),
            read_errors: "0".to_string(),
            write_errors: "0".to_string(),
            checksum_errors: "0".to_string(),
            path: None,
            children: Vec::new(),
        };
    }

    if vdevs.len() == 1 {
        #[allow(clippy::expect_used)]
        let (_, only) = vdevs.iter().next().expect("len checked above");
        return convert_vdev(only);
    }

    VdevNode {
        name: "root".to_string(),
        kind: VdevKind::Root,
        state: VdevState::Online,
        read_errors: "0".to_string(),
        write_errors: "0".to_string(),
        checksum_errors: "0".to_string(),
        path: None,
        children: vdevs.values().map(convert_vdev).collect(),
    }
}

fn convert_vdev(raw: &RawVdev) -> VdevNode {
    let name = raw.name.clone().unwrap_or_else(|| "unknown".to_string());
    let kind = raw.vdev_type.as_deref().map(VdevKind::from_json_tag).unwrap_or(VdevKind::Unknown(
        "unknown".to_string(),
    ));
    let state = raw.state.as_deref().map(VdevState::parse).unwrap_or(VdevState::Unknown(
        "UNKNOWN".to_string(),
    ));
    let children: Vec<VdevNode> = raw.vdevs.values().map(convert_vdev).collect();
    VdevNode {
        name,
        kind,
        state,
        read_errors: value_to_counter_string(raw.read_errors.as_ref()),
        write_errors: value_to_counter_string(raw.write_errors.as_ref()),
        checksum_errors: value_to_counter_string(raw.checksum_errors.as_ref()),
        path: if children.is_empty() { raw.path.clone() } else { None },
        children,
    }
}

#[cfg(test)]
#[path = "json_mode_tests.rs"]
mod tests;
