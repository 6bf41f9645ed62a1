// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The benign-stderr-to-success table: mount/unmount/load-key/unload-key/
//! list-importable-pools/remove-vdev each recognize a small, fixed set of
//! "already in the desired state" stderr substrings. Centralized here as
//! one `const` table plus per-command predicates, so the exhaustive set
//! has a single source of truth to test against rather than six
//! independent substring checks drifting apart.

/// `(command, substrings)`: a non-zero exit from `command` is downgraded to
/// success if `stderr` (lowercased) contains *any* of these substrings.
/// This is the literal, exhaustive set — no more, no less.
pub const BENIGN_STDERR_TABLE: &[(&str, &[&str])] = &[
    ("mount", &["already mounted", "keystore", "keys are not loaded"]),
    ("unmount", &["not mounted"]),
    ("load-key", &["keys are already loaded"]),
    ("unload-key", &["keys are already unloaded", "dataset is not encrypted"]),
    ("import-l", &["no pools available for import"]),
    ("remove", &["is busy", "i/o error"]),
];

fn matches_any(stderr_lower: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| stderr_lower.contains(needle))
}

fn lookup(command: &str) -> &'static [&'static str] {
    BENIGN_STDERR_TABLE
        .iter()
        .find(|(name, _)| *name == command)
        .map(|(_, needles)| *needles)
        .unwrap_or(&[])
}

/// True if `stderr` from the named command (one of the `BENIGN_STDERR_TABLE`
/// keys) should be treated as a benign, non-error condition.
pub fn is_benign(command: &str, stderr: &str) -> bool {
    matches_any(&stderr.to_lowercase(), lookup(command))
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
