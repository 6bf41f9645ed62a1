// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trust-on-first-use certificate pinning record: one entry per
//! `host:port`, holding the SHA-256 fingerprint observed on first contact
//! plus bookkeeping timestamps.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedCertificate {
    /// Hex-encoded SHA-256 fingerprint of the DER-encoded certificate.
    pub fingerprint: String,
    pub first_seen_epoch_ms: u64,
    pub last_verified_epoch_ms: u64,
}
