// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Vdev spec validation. Every `create_pool`/`add_vdev` request is
//! validated in full *before* any argv is built or subprocess launched.

use serde::Deserialize;

use crate::error::RegistryError;

/// A vdev spec as received over the wire: `{ type: string, devices: [string] }`.
/// `deny_unknown_fields` turns an unrecognized key into a deserialization
/// error at the wire boundary, so an unknown field fails with a
/// pre-dispatch validation error rather than silently being ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawVdevSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub devices: Vec<String>,
}

/// A vdev spec after validation: lowercased type, trimmed non-empty device
/// paths, device count checked against the type's minimum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedVdev {
    pub kind: String,
    pub devices: Vec<String>,
}

/// Minimum member-device counts: "mirror≥2, raidz1≥3,
/// raidz2≥4, raidz3≥5, special-mirror/dedup-mirror≥2, others ≥1".
fn min_devices_for(kind: &str) -> usize {
    match kind {
        "mirror" | "special mirror" | "dedup mirror" => 2,
        "raidz1" => 3,
        "raidz2" => 4,
        "raidz3" => 5,
        _ => 1,
    }
}

/// Validate one vdev spec in the context of a containing request
/// (`context` is folded into the error message, e.g. `"create_pool 'tank'
/// spec #0"`, so a validation failure names which spec in a multi-vdev
/// request is at fault).
pub fn validate_vdev_spec(raw: &RawVdevSpec, context: &str) -> Result<ValidatedVdev, RegistryError> {
    let kind = raw.kind.trim().to_lowercase();
    if kind.is_empty() {
        return Err(RegistryError::Validation(format!(
            "invalid vdev spec in {context}: missing or empty 'type'"
        )));
    }

    if raw.devices.is_empty() {
        return Err(RegistryError::Validation(format!(
            "invalid vdev spec in {context}: missing or empty 'devices' list for type '{kind}'"
        )));
    }

    let mut devices = Vec::with_capacity(raw.devices.len());
    for (i, dev) in raw.devices.iter().enumerate() {
        let trimmed = dev.trim();
        if trimmed.is_empty() {
            return Err(RegistryError::Validation(format!(
                "invalid device path at index {i} in {context} for type '{kind}': must be a non-empty string"
            )));
        }
        if !trimmed.starts_with("/dev/") {
            tracing::warn!(device = trimmed, %context, "device path does not start with /dev/, proceeding cautiously");
        }
        devices.push(trimmed.to_string());
    }

    let min = min_devices_for(&kind);
    if devices.len() < min {
        return Err(RegistryError::Validation(format!(
            "invalid vdev spec in {context}: type '{kind}' requires at least {min} device(s), got {}",
            devices.len()
        )));
    }

    Ok(ValidatedVdev { kind, devices })
}

/// Validate every spec in a `create_pool`/`add_vdev` request up front,
/// short-circuiting on the first failure so no argv is built for a request
/// that has any invalid member.
pub fn validate_all(raw: &[RawVdevSpec], context: &str) -> Result<Vec<ValidatedVdev>, RegistryError> {
    if raw.is_empty() {
        return Err(RegistryError::Validation(format!(
            "no vdev specifications provided for {context}"
        )));
    }
    raw.iter()
        .enumerate()
        .map(|(i, spec)| validate_vdev_spec(spec, &format!("{context} spec #{i}")))
        .collect()
}

#[cfg(test)]
#[path = "vdev_spec_tests.rs"]
mod tests;
