// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Legacy text-mode parser for `zpool status -P` (pre-OpenZFS 2.3.1):
//! line-oriented, indentation-tracked tree construction between `config:`
//! and `errors:`,
//! generalized to recognize group-vdev name patterns
//! (`mirror-N`, `raidzN-N`, `draidN:...`, `logs`, `cache`, `spares`,
//! `special`) versus device-path patterns so a device row under an
//! unrecognized group name is still classified correctly, and so
//! unparseable rows are skipped without poisoning the rest of the tree.

use tracing::debug;

use zfdash_core::{PoolStatus, VdevKind, VdevNode, VdevState};

/// Parse the legacy text form of `zpool status -P [pool_name]`.
///
/// Pure function: no I/O, no global state. `pool_name` filters the result
/// when multiple pools' output is concatenated.
pub fn parse_status_text(raw_text: &str, pool_name: Option<&str>) -> Vec<PoolStatus> {
    let mut pools = Vec::new();

    let mut current_name: Option<String> = None;
    let mut current_state = "UNKNOWN".to_string();
    let mut current_errors = "no known data errors".to_string();
    let mut in_config = false;
    // (indent, node) stack; index 0 (once present) is the pool's root vdev.
    let mut stack: Vec<(usize, VdevNode)> = Vec::new();

    let flush_pool =
        |pools: &mut Vec<PoolStatus>,
         stack: &mut Vec<(usize, VdevNode)>,
         name: Option<String>,
         state: &str,
         errors: &str| {
            let Some(name) = name else { return };
            collapse_stack(stack);
            let vdev_tree = stack.pop().map(|(_, node)| node).unwrap_or_else(empty_root);
            pools.push(PoolStatus {
                name,
                state: state.to_string(),
                scan: None,
                errors: errors.to_string(),
                vdev_tree,
            });
        };

    for line in raw_text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(name) = trimmed.strip_prefix("pool:") {
            flush_pool(&mut pools, &mut stack, current_name.take(), &current_state, &current_errors);
            current_name = Some(name.trim().to_string());
            current_state = "UNKNOWN".to_string();
            current_errors = "no known data errors".to_string();
            in_config = false;
            stack.clear();
            continue;
        }

        if current_name.is_none() {
            continue;
        }

        if let Some(state) = trimmed.strip_prefix("state:") {
            current_state = state.trim().to_string();
            continue;
        }

        if trimmed.starts_with("config:") {
            in_config = true;
            stack.clear();
            continue;
        }

        if trimmed.starts_with("errors:") {
            if let Some((_, rest)) = trimmed.split_once(':') {
                current_errors = rest.trim().to_string();
            }
            in_config = false;
            continue;
        }

        if !in_config {
            continue;
        }

        if trimmed.starts_with("NAME") && trimmed.contains("STATE") {
            continue;
        }

        let Some(row) = parse_config_row(line) else {
            debug!(line, "skipping unparseable zpool status config row");
            continue;
        };

        let is_pool_root = stack.is_empty() && current_name.as_deref() == Some(row.name.as_str());
        let kind = if is_pool_root { VdevKind::Root } else { classify(&row.name) };
        let node = VdevNode {
            name: row.name.clone(),
            kind: kind.clone(),
            state: row.state,
            read_errors: row.read_errors,
            write_errors: row.write_errors,
            checksum_errors: row.checksum_errors,
            path: if matches!(kind, VdevKind::Disk) { Some(row.name.clone()) } else { None },
            children: Vec::new(),
        };

        if is_pool_root {
            stack.push((row.indent, node));
            continue;
        }

        // Pop every entry whose indent is >= this row's, attaching each
        // popped node to its new parent, until the stack top is a
        // strictly shallower ancestor (or only root remains).
        #[allow(clippy::expect_used)]
        while stack.len() > 1 && row.indent <= stack.last().expect("len > 1").0 {
            #[allow(clippy::expect_used)]
            let (_, popped) = stack.pop().expect("len > 1");
            if let Some((_, parent)) = stack.last_mut() {
                parent.children.push(popped);
            }
        }

        stack.push((row.indent, node));
    }

    flush_pool(&mut pools, &mut stack, current_name, &current_state, &current_errors);

    match pool_name {
        Some(filter) => pools.into_iter().filter(|p| p.name == filter).collect(),
        None => pools,
    }
}

/// Collapse every stack entry above index 0 into its parent's children,
/// leaving only the root (if any) at index 0.
fn collapse_stack(stack: &mut Vec<(usize, VdevNode)>) {
    while stack.len() > 1 {
        #[allow(clippy::expect_used)]
        let (_, popped) = stack.pop().expect("len > 1");
        if let Some((_, parent)) = stack.last_mut() {
            parent.children.push(popped);
        }
    }
}

fn empty_root() -> VdevNode {
    VdevNode {
        name: "root".to_string(),
        kind: VdevKind::Root,
        state: VdevState::Unknown(String::new()),
        read_errors: "0".to_string(),
        write_errors: "0".to_string(),
        checksum_errors: "0".to_string(),
        path: None,
        children: Vec::new(),
    }
}

struct ConfigRow {
    indent: usize,
    name: String,
    state: VdevState,
    read_errors: String,
    write_errors: String,
    checksum_errors: String,
}

/// Parse one row of the `config:` section. Two shapes:
/// - a device/group row followed by `STATE READ WRITE CKSUM` (4 tokens), or
/// - a bare name row (group header with no error columns).
fn parse_config_row(line: &str) -> Option<ConfigRow> {
    let indent = line.len() - line.trim_start().len();
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    if tokens.len() >= 5 {
        return Some(ConfigRow {
            indent,
            name: tokens[0].to_string(),
            state: VdevState::parse(tokens[1]),
            read_errors: tokens[2].to_string(),
            write_errors: tokens[3].to_string(),
            checksum_errors: tokens[4].to_string(),
        });
    }

    Some(ConfigRow {
        indent,
        name: tokens[0].to_string(),
        state: VdevState::Online,
        read_errors: "0".to_string(),
        write_errors: "0".to_string(),
        checksum_errors: "0".to_string(),
    })
}

/// Classify a non-root config-row name as a group vdev or a leaf disk.
fn classify(name: &str) -> VdevKind {
    if looks_like_group(name) {
        VdevKind::from_name(name)
    } else {
        VdevKind::Disk
    }
}

/// Group-vdev name patterns: `mirror-N`, `raidzN-N`,
/// `draidN:...`, or the bare group-section headers.
fn looks_like_group(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.starts_with("mirror")
        || lower.starts_with("raidz")
        || lower.starts_with("draid")
        || matches!(
            lower.as_str(),
            "logs" | "log" | "cache" | "spares" | "spare" | "special" | "dedup"
        )
}

#[cfg(test)]
#[path = "text_mode_tests.rs"]
mod tests;
