// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! macOS block device adapter: `diskutil list -plist` → [`BlockDevice`] list,
//! decoded with the `plist` crate.

use serde::Deserialize;

use zfdash_core::BlockDevice;
use zfdash_runner::discover_binary;

use crate::EnumerationError;

#[derive(Debug, Deserialize)]
struct DiskutilList {
    #[serde(default, rename = "AllDisksAndPartitions")]
    all_disks_and_partitions: Vec<DiskutilDisk>,
}

#[derive(Debug, Deserialize)]
struct DiskutilDisk {
    #[serde(rename = "DeviceIdentifier")]
    device_identifier: String,
    #[serde(default, rename = "Size")]
    size: Option<u64>,
    #[serde(default, rename = "MediaName")]
    media_name: Option<String>,
    #[serde(default, rename = "RemovableMediaOrExternalDevice")]
    removable: bool,
    #[serde(default, rename = "MountPoint")]
    mount_point: Option<String>,
    #[serde(default, rename = "Partitions")]
    partitions: Vec<DiskutilPartition>,
}

#[derive(Debug, Deserialize)]
struct DiskutilPartition {
    #[serde(rename = "DeviceIdentifier")]
    device_identifier: String,
    #[serde(default, rename = "Size")]
    size: Option<u64>,
    #[serde(default, rename = "VolumeName")]
    volume_name: Option<String>,
    #[serde(default, rename = "MountPoint")]
    mount_point: Option<String>,
}

pub async fn enumerate() -> Result<Vec<BlockDevice>, EnumerationError> {
    let diskutil = discover_binary("diskutil").map_err(|e| EnumerationError::Spawn {
        tool: "diskutil".to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()),
    })?;

    let output = tokio::process::Command::new(&diskutil)
        .args(["list", "-plist"])
        .output()
        .await
        .map_err(|source| EnumerationError::Spawn { tool: "diskutil".to_string(), source })?;

    let parsed: DiskutilList = plist::from_bytes(&output.stdout).map_err(|e| {
        EnumerationError::Parse { tool: "diskutil".to_string(), message: e.to_string() }
    })?;

    let pool_members = pool_member_device_names().await;

    let mut devices = Vec::new();
    for disk in &parsed.all_disks_and_partitions {
        devices.push(BlockDevice {
            path: format!("/dev/{}", disk.device_identifier),
            model: disk.media_name.clone(),
            size_bytes: disk.size.unwrap_or(0),
            removable: disk.removable,
            is_partition: false,
            mountpoint: disk.mount_point.clone(),
            pool_member_of: pool_members.get(&disk.device_identifier).cloned(),
            eligible: true,
            disable_reason: None,
        });
        for part in &disk.partitions {
            devices.push(BlockDevice {
                path: format!("/dev/{}", part.device_identifier),
                model: part.volume_name.clone(),
                size_bytes: part.size.unwrap_or(0),
                removable: disk.removable,
                is_partition: true,
                mountpoint: part.mount_point.clone(),
                pool_member_of: pool_members.get(&part.device_identifier).cloned(),
                eligible: true,
                disable_reason: None,
            });
        }
    }
    Ok(devices)
}

async fn pool_member_device_names() -> std::collections::HashSet<String> {
    let mut members = std::collections::HashSet::new();
    let Ok(zpool) = discover_binary("zpool") else {
        return members;
    };
    let Ok(Ok(output)) = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        tokio::process::Command::new(&zpool).args(["status", "-P"]).output(),
    )
    .await
    else {
        return members;
    };
    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines() {
        if let Some(path) = line.trim().split_whitespace().next() {
            if let Some(name) = path.strip_prefix("/dev/") {
                members.insert(name.to_string());
            }
        }
    }
    members
}
