// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Linux block device adapter: `lsblk --json` → [`BlockDevice`] list.
//! Uses `zfdash-runner`'s binary discovery for locating `lsblk`/`zpool`
//! without a hardcoded path.

use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

use zfdash_core::BlockDevice;
use zfdash_runner::discover_binary;

use crate::EnumerationError;

#[derive(Debug, Deserialize)]
struct LsblkRoot {
    #[serde(default)]
    blockdevices: Vec<LsblkDevice>,
}

#[derive(Debug, Deserialize)]
struct LsblkDevice {
    name: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default, rename = "rm")]
    removable: bool,
    #[serde(default)]
    mountpoint: Option<String>,
    #[serde(default)]
    #[serde(rename = "type")]
    device_type: Option<String>,
    #[serde(default)]
    children: Vec<LsblkDevice>,
}

pub async fn enumerate() -> Result<Vec<BlockDevice>, EnumerationError> {
    let lsblk = discover_binary("lsblk")
        .map_err(|e| EnumerationError::Spawn {
            tool: "lsblk".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()),
        })?;

    let output = tokio::process::Command::new(&lsblk)
        .args(["--json", "--bytes", "--output", "NAME,MODEL,SIZE,RM,MOUNTPOINT,TYPE"])
        .output()
        .await
        .map_err(|source| EnumerationError::Spawn { tool: "lsblk".to_string(), source })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let root: LsblkRoot = serde_json::from_str(&stdout)
        .map_err(|e| EnumerationError::Parse { tool: "lsblk".to_string(), message: e.to_string() })?;

    let pool_members = pool_member_device_names().await;

    let mut devices = Vec::new();
    for dev in &root.blockdevices {
        flatten(dev, None, &pool_members, &mut devices);
    }
    Ok(devices)
}

fn flatten(
    dev: &LsblkDevice,
    parent: Option<&str>,
    pool_members: &HashSet<String>,
    out: &mut Vec<BlockDevice>,
) {
    let is_partition = dev.device_type.as_deref() == Some("part") || parent.is_some();
    let path = format!("/dev/{}", dev.name);
    out.push(BlockDevice {
        path: path.clone(),
        model: dev.model.clone().filter(|m| !m.trim().is_empty()),
        size_bytes: dev.size.unwrap_or(0),
        removable: dev.removable,
        is_partition,
        mountpoint: dev.mountpoint.clone().filter(|m| !m.is_empty()),
        pool_member_of: pool_members.get(&dev.name).cloned(),
        eligible: true,
        disable_reason: None,
    });
    for child in &dev.children {
        flatten(child, Some(&dev.name), pool_members, out);
    }
}

/// Best-effort `zpool status` scan to map device names already claimed by
/// a pool, so the shared filter can tag [`DisableReason::PoolMember`](zfdash_core::DisableReason::PoolMember).
/// Failure here (e.g. `zpool` missing) degrades to "no known pool members"
/// rather than failing the whole enumeration.
async fn pool_member_device_names() -> HashSet<String> {
    let mut members = HashSet::new();
    let Ok(zpool) = discover_binary("zpool") else {
        return members;
    };
    let Ok(output) = tokio::time::timeout(
        Duration::from_secs(5),
        tokio::process::Command::new(&zpool).args(["status", "-P"]).output(),
    )
    .await
    else {
        return members;
    };
    let Ok(output) = output else { return members };
    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines() {
        let trimmed = line.trim();
        if let Some(path) = trimmed.split_whitespace().next() {
            if path.starts_with("/dev/") {
                if let Some(name) = path.strip_prefix("/dev/") {
                    members.insert(name.to_string());
                }
            }
        }
    }
    members
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_marks_children_as_partitions() {
        let dev = LsblkDevice {
            name: "sda".to_string(),
            model: Some("Samsung SSD".to_string()),
            size: Some(1_000_000_000_000),
            removable: false,
            mountpoint: None,
            device_type: Some("disk".to_string()),
            children: vec![LsblkDevice {
                name: "sda1".to_string(),
                model: None,
                size: Some(500_000_000_000),
                removable: false,
                mountpoint: Some("/".to_string()),
                device_type: Some("part".to_string()),
                children: vec![],
            }],
        };
        let mut out = Vec::new();
        flatten(&dev, None, &HashSet::new(), &mut out);
        assert_eq!(out.len(), 2);
        assert!(!out[0].is_partition);
        assert!(out[1].is_partition);
        assert_eq!(out[1].mountpoint.as_deref(), Some("/"));
    }

    #[test]
    fn lsblk_json_parses() {
        let raw = r#"{"blockdevices":[{"name":"sda","model":"QEMU HARDDISK","size":107374182400,"rm":false,"mountpoint":null,"type":"disk","children":[]}]}"#;
        let root: LsblkRoot = serde_json::from_str(raw).unwrap();
        assert_eq!(root.blockdevices.len(), 1);
        assert_eq!(root.blockdevices[0].name, "sda");
    }
}
