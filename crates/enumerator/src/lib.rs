// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! zfdash-enumerator: cross-platform block device enumeration, the input
//! to pool construction.
//!
//! Each platform adapter shells out to the platform's standard structured
//! listing tool (`lsblk --json` on Linux, `diskutil list -plist` on
//! macOS), parses its native structured format, and hands the raw device
//! list to a single shared [`filter`] so the eligibility rule lives in
//! exactly one place regardless of platform.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod filter;
mod linux;
#[cfg(target_os = "macos")]
mod macos;

pub use filter::{annotate, apply_filter, FilterPolicy};

use thiserror::Error;
use zfdash_core::BlockDevice;

#[derive(Debug, Error)]
pub enum EnumerationError {
    #[error("failed to run '{tool}': {source}")]
    Spawn { tool: String, #[source] source: std::io::Error },
    #[error("failed to parse '{tool}' output: {message}")]
    Parse { tool: String, message: String },
    #[error("no block device adapter for this platform")]
    UnsupportedPlatform,
}

/// Result of a device enumeration pass: everything seen (`all_devices`)
/// plus the filtered subset eligible for pool construction (`devices`),
/// "Block device record" data model.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EnumerationResult {
    pub platform: String,
    pub all_devices: Vec<BlockDevice>,
    pub devices: Vec<BlockDevice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Enumerate block devices on the current platform, applying the default
/// eligibility filter.
pub async fn list_block_devices() -> EnumerationResult {
    list_block_devices_with_policy(&FilterPolicy::default()).await
}

/// Enumerate block devices, applying a caller-supplied filter policy (used
/// by tests to probe the "below the policy threshold" removable-device
/// rule without depending on real hardware).
pub async fn list_block_devices_with_policy(policy: &FilterPolicy) -> EnumerationResult {
    #[cfg(target_os = "macos")]
    let (platform, raw) = ("macos", macos::enumerate().await);
    #[cfg(all(target_os = "linux", not(target_os = "macos")))]
    let (platform, raw) = ("linux", linux::enumerate().await);
    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    let (platform, raw): (&str, Result<Vec<BlockDevice>, EnumerationError>) =
        ("unknown", Err(EnumerationError::UnsupportedPlatform));

    match raw {
        Ok(raw_devices) => {
            let all_devices = annotate(&raw_devices, policy);
            let devices = all_devices.iter().filter(|d| d.eligible).cloned().collect();
            EnumerationResult {
                platform: platform.to_string(),
                all_devices,
                devices,
                error: None,
            }
        }
        Err(e) => EnumerationResult {
            platform: platform.to_string(),
            all_devices: Vec::new(),
            devices: Vec::new(),
            error: Some(e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unsupported_platform_reports_error_not_panic() {
        // Exercises the plumbing end to end on whatever CI platform runs
        // this; a hard failure here would mean the adapter call itself
        // panics rather than surfacing a structured error.
        let result = list_block_devices().await;
        assert!(!result.platform.is_empty());
    }
}
