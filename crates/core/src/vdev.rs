// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! VDEV tree types shared between the status parser and the wire protocol.

use serde::{Deserialize, Serialize};

/// Kind of a vdev node in a pool's configuration tree.
///
/// Mirrors the exact type tags `zpool status -j` emits so JSON-mode
/// parsing (which copies `vdev_type` verbatim) round-trips without
/// translation. `Unknown` is the escape hatch for anything `zpool status`
/// emits that this enum hasn't been taught about yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VdevKind {
    Root,
    Mirror,
    Raidz,
    Raidz1,
    Raidz2,
    Raidz3,
    Draid,
    Log,
    Cache,
    Spare,
    Special,
    Dedup,
    Disk,
    Unknown(String),
}

impl VdevKind {
    /// Minimum number of member devices this kind requires when building a
    /// `create_pool`/`add_vdev` spec.
    pub fn min_devices(&self) -> usize {
        match self {
            VdevKind::Mirror | VdevKind::Special | VdevKind::Dedup => 2,
            VdevKind::Raidz1 => 3,
            VdevKind::Raidz2 => 4,
            VdevKind::Raidz3 => 5,
            _ => 1,
        }
    }

    /// Parse a vdev name/type string as seen in `zpool status` text output
    /// (e.g. `mirror-0`, `raidz2-1`, `logs`, `draid2:4d:2s:0`) into a kind.
    pub fn from_name(name: &str) -> Self {
        if name.starts_with("mirror") {
            VdevKind::Mirror
        } else if name.starts_with("raidz3") {
            VdevKind::Raidz3
        } else if name.starts_with("raidz2") {
            VdevKind::Raidz2
        } else if name.starts_with("raidz1") {
            VdevKind::Raidz1
        } else if name.starts_with("raidz") {
            VdevKind::Raidz
        } else if name.starts_with("draid") {
            VdevKind::Draid
        } else {
            match name {
                "logs" | "log" => VdevKind::Log,
                "cache" => VdevKind::Cache,
                "special" => VdevKind::Special,
                "dedup" => VdevKind::Dedup,
                "spares" | "spare" => VdevKind::Spare,
                other => VdevKind::Unknown(other.to_string()),
            }
        }
    }

    /// Parse the `vdev_type` tag as emitted by `zpool status -j`.
    pub fn from_json_tag(tag: &str) -> Self {
        match tag {
            "root" => VdevKind::Root,
            "mirror" => VdevKind::Mirror,
            "raidz" => VdevKind::Raidz,
            "raidz1" => VdevKind::Raidz1,
            "raidz2" => VdevKind::Raidz2,
            "raidz3" => VdevKind::Raidz3,
            "draid" => VdevKind::Draid,
            "log" => VdevKind::Log,
            "cache" => VdevKind::Cache,
            "spare" => VdevKind::Spare,
            "special" => VdevKind::Special,
            "dedup" => VdevKind::Dedup,
            "disk" | "file" => VdevKind::Disk,
            other => VdevKind::Unknown(other.to_string()),
        }
    }
}

/// Health state of a vdev as reported by `zpool status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VdevState {
    Online,
    Degraded,
    Faulted,
    Offline,
    Unavail,
    Removed,
    Split,
    Unknown(String),
}

impl VdevState {
    pub fn parse(s: &str) -> Self {
        match s {
            "ONLINE" => VdevState::Online,
            "DEGRADED" => VdevState::Degraded,
            "FAULTED" => VdevState::Faulted,
            "OFFLINE" => VdevState::Offline,
            "UNAVAIL" => VdevState::Unavail,
            "REMOVED" => VdevState::Removed,
            "SPLIT" => VdevState::Split,
            other => VdevState::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            VdevState::Online => "ONLINE",
            VdevState::Degraded => "DEGRADED",
            VdevState::Faulted => "FAULTED",
            VdevState::Offline => "OFFLINE",
            VdevState::Unavail => "UNAVAIL",
            VdevState::Removed => "REMOVED",
            VdevState::Split => "SPLIT",
            VdevState::Unknown(s) => s,
        }
    }
}

/// One node in a pool's vdev configuration tree (root, top-level vdev, or leaf device).
///
/// Invariant: a leaf has `children = []` and `path.is_some()`;
/// a grouping vdev has `children != []` and `path = None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VdevNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VdevKind,
    pub state: VdevState,
    /// Kept as strings (not integers): the wire protocol
    /// reproduces ZFS's own error-counter formatting byte-for-byte.
    pub read_errors: String,
    pub write_errors: String,
    pub checksum_errors: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub children: Vec<VdevNode>,
}

impl VdevNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Depth-first count of leaf (disk-like) descendants, including self if leaf.
    pub fn leaf_count(&self) -> usize {
        if self.children.is_empty() {
            1
        } else {
            self.children.iter().map(VdevNode::leaf_count).sum()
        }
    }

    /// Depth-first iterator yielding every node in the tree, self included.
    pub fn iter(&self) -> VdevIter<'_> {
        VdevIter { stack: vec![self] }
    }
}

pub struct VdevIter<'a> {
    stack: Vec<&'a VdevNode>,
}

impl<'a> Iterator for VdevIter<'a> {
    type Item = &'a VdevNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

#[cfg(test)]
#[path = "vdev_tests.rs"]
mod tests;
