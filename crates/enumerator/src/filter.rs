// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The shared eligibility filter every platform adapter feeds through
//!: excludes devices with mounted partitions, devices
//! already members of a pool, removable devices, and devices below a
//! minimum size, each tagged with its [`DisableReason`](zfdash_core::DisableReason).

use zfdash_core::{BlockDevice, DisableReason};

/// Tunable thresholds for the shared filter. Exists mainly so tests can
/// probe "below the policy threshold" without needing real small disks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterPolicy {
    pub min_size_bytes: u64,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        // 1 GiB: anything smaller is almost certainly a boot/EFI partition
        // or a misdetected loop device, never a useful ZFS vdev member.
        Self { min_size_bytes: 1024 * 1024 * 1024 }
    }
}

/// Decide why (if at all) `device` should be excluded from the eligible
/// set, in priority order: pool membership, mount, removability, size.
fn disable_reason(device: &BlockDevice, policy: &FilterPolicy) -> Option<DisableReason> {
    if device.pool_member_of.is_some() {
        return Some(DisableReason::PoolMember);
    }
    if device.mountpoint.is_some() {
        return Some(DisableReason::Mounted);
    }
    if device.removable {
        return Some(DisableReason::Removable);
    }
    if device.size_bytes < policy.min_size_bytes {
        return Some(DisableReason::TooSmall);
    }
    None
}

/// Stamp every device with `eligible`/`disable_reason`, without dropping
/// any — this is what `all_devices` carries (: "Excluded devices
/// remain in `all_devices` and carry a `disable_reason`").
pub fn annotate(devices: &[BlockDevice], policy: &FilterPolicy) -> Vec<BlockDevice> {
    devices
        .iter()
        .cloned()
        .map(|mut d| {
            let reason = disable_reason(&d, policy);
            d.eligible = reason.is_none();
            d.disable_reason = reason;
            d
        })
        .collect()
}

/// Apply the shared filter to a raw device list, returning only the
/// eligible subset, annotated the same way [`annotate`] would.
pub fn apply_filter(devices: &[BlockDevice], policy: &FilterPolicy) -> Vec<BlockDevice> {
    annotate(devices, policy).into_iter().filter(|d| d.eligible).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(path: &str, size_bytes: u64) -> BlockDevice {
        BlockDevice {
            path: path.to_string(),
            model: None,
            size_bytes,
            removable: false,
            is_partition: false,
            mountpoint: None,
            pool_member_of: None,
            eligible: true,
            disable_reason: None,
        }
    }

    #[test]
    fn mounted_device_is_excluded() {
        let mut d = device("/dev/sda", 2 * 1024 * 1024 * 1024);
        d.mountpoint = Some("/mnt/data".to_string());
        let out = apply_filter(&[d], &FilterPolicy::default());
        assert!(out.is_empty());
    }

    #[test]
    fn pool_member_is_excluded() {
        let mut d = device("/dev/sda", 2 * 1024 * 1024 * 1024);
        d.pool_member_of = Some("tank".to_string());
        let out = apply_filter(&[d], &FilterPolicy::default());
        assert!(out.is_empty());
    }

    #[test]
    fn removable_device_is_excluded() {
        let mut d = device("/dev/sdb", 2 * 1024 * 1024 * 1024);
        d.removable = true;
        let out = apply_filter(&[d], &FilterPolicy::default());
        assert!(out.is_empty());
    }

    #[test]
    fn undersized_device_is_excluded() {
        let d = device("/dev/sdc", 100 * 1024 * 1024);
        let out = apply_filter(&[d], &FilterPolicy::default());
        assert!(out.is_empty());
    }

    #[test]
    fn eligible_device_passes_and_is_unmarked() {
        let d = device("/dev/sdd", 4 * 1024 * 1024 * 1024);
        let out = apply_filter(&[d], &FilterPolicy::default());
        assert_eq!(out.len(), 1);
        assert!(out[0].eligible);
        assert!(out[0].disable_reason.is_none());
    }

    #[test]
    fn priority_order_is_pool_member_before_mount() {
        let mut d = device("/dev/sde", 4 * 1024 * 1024 * 1024);
        d.pool_member_of = Some("tank".to_string());
        d.mountpoint = Some("/mnt".to_string());
        assert_eq!(disable_reason(&d, &FilterPolicy::default()), Some(DisableReason::PoolMember));
    }
}
