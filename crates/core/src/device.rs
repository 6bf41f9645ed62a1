// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Block device records produced by the platform device enumerators.

use serde::{Deserialize, Serialize};

/// Why a device is not offered as an eligible vdev member.
///
/// Kept as a sum type (rather than a free-text string) so the client can
/// render each reason distinctly without pattern-matching on prose; the
/// `Unknown` arm remains for platform-specific cases the shared filter
/// hasn't been taught a name for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisableReason {
    Mounted,
    PoolMember,
    Removable,
    TooSmall,
    ReadOnly,
    SystemDisk,
    Unknown(String),
}

/// A block device (or partition) surfaced by the platform-specific adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDevice {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub size_bytes: u64,
    pub removable: bool,
    pub is_partition: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mountpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_member_of: Option<String>,
    pub eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_reason: Option<DisableReason>,
}
