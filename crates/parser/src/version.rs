// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ZFS version detection: decides whether `zpool status -j` (JSON mode) is
//! available by matching `zfs-(\d+)\.(\d+)\.(\d+)` against `zpool --version`
//! stdout.

/// Minimum OpenZFS version exposing `zpool status -j`.
pub const ZPOOL_JSON_MIN_VERSION: (u32, u32, u32) = (2, 3, 1);

/// Parse `zpool --version` stdout and decide whether the legacy text parser
/// is required. Defaults to `true` (legacy) when no version string is
/// found, matching the original's fail-safe behavior.
pub fn needs_legacy_parser(version_stdout: &str) -> bool {
    match extract_version(version_stdout) {
        Some(version) => version < ZPOOL_JSON_MIN_VERSION,
        None => true,
    }
}

fn extract_version(stdout: &str) -> Option<(u32, u32, u32)> {
    let idx = stdout.find("zfs-")?;
    let rest = &stdout[idx + 4..];
    let mut parts = rest.split(|c: char| !c.is_ascii_digit() && c != '.');
    let version_str = parts.next()?;
    let mut numbers = version_str.split('.');
    let major = numbers.next()?.parse().ok()?;
    let minor = numbers.next()?.parse().ok()?;
    let patch = numbers.next()?.parse().ok()?;
    Some((major, minor, patch))
}
