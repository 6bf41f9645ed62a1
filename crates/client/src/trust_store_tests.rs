// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

use zfdash_core::trust::TrustedCertificate;

#[test]
fn load_on_empty_directory_returns_empty_map() {
    let dir = tempfile::tempdir().unwrap();
    let store = load(dir.path()).unwrap();
    assert!(store.is_empty());
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    save(
        dir.path(),
        "host.example:9999",
        &TrustedCertificate { fingerprint: "abc123".to_string(), first_seen_epoch_ms: 10, last_verified_epoch_ms: 10 },
    )
    .unwrap();

    let store = load(dir.path()).unwrap();
    let record = store.get("host.example:9999").unwrap();
    assert_eq!(record.fingerprint, "abc123");
    assert_eq!(record.first_seen_epoch_ms, 10);
}

#[test]
fn first_contact_auto_trusts_and_pins() {
    let dir = tempfile::tempdir().unwrap();
    verify_tofu_with_clock(dir.path(), "host.example", 443, "fingerprint-a", &FixedClock(1_000)).unwrap();

    let store = load(dir.path()).unwrap();
    let record = store.get("host.example:443").unwrap();
    assert_eq!(record.fingerprint, "fingerprint-a");
    assert_eq!(record.first_seen_epoch_ms, 1_000);
    assert_eq!(record.last_verified_epoch_ms, 1_000);
}

#[test]
fn matching_fingerprint_updates_last_verified_only() {
    let dir = tempfile::tempdir().unwrap();
    verify_tofu_with_clock(dir.path(), "host.example", 443, "fingerprint-a", &FixedClock(1_000)).unwrap();
    verify_tofu_with_clock(dir.path(), "host.example", 443, "fingerprint-a", &FixedClock(5_000)).unwrap();

    let store = load(dir.path()).unwrap();
    let record = store.get("host.example:443").unwrap();
    assert_eq!(record.first_seen_epoch_ms, 1_000);
    assert_eq!(record.last_verified_epoch_ms, 5_000);
}

#[test]
fn mismatched_fingerprint_fails_closed_without_mutating_store() {
    let dir = tempfile::tempdir().unwrap();
    verify_tofu_with_clock(dir.path(), "host.example", 443, "fingerprint-a", &FixedClock(1_000)).unwrap();

    let err = verify_tofu_with_clock(dir.path(), "host.example", 443, "fingerprint-b", &FixedClock(2_000)).unwrap_err();
    assert!(matches!(err, ClientError::CertificateMismatch { ref host_key, ref expected, ref received }
        if host_key == "host.example:443" && expected == "fingerprint-a" && received == "fingerprint-b"));

    let store = load(dir.path()).unwrap();
    let record = store.get("host.example:443").unwrap();
    assert_eq!(record.fingerprint, "fingerprint-a");
    assert_eq!(record.last_verified_epoch_ms, 1_000);
}

#[test]
fn remove_deletes_only_the_matching_entry() {
    let dir = tempfile::tempdir().unwrap();
    save(
        dir.path(),
        "host-a:443",
        &TrustedCertificate { fingerprint: "a".to_string(), first_seen_epoch_ms: 1, last_verified_epoch_ms: 1 },
    )
    .unwrap();
    save(
        dir.path(),
        "host-b:443",
        &TrustedCertificate { fingerprint: "b".to_string(), first_seen_epoch_ms: 1, last_verified_epoch_ms: 1 },
    )
    .unwrap();

    let removed = remove(dir.path(), "host-a", 443).unwrap();
    assert!(removed);

    let store = load(dir.path()).unwrap();
    assert!(!store.contains_key("host-a:443"));
    assert!(store.contains_key("host-b:443"));
}

#[test]
fn remove_on_unknown_host_returns_false() {
    let dir = tempfile::tempdir().unwrap();
    assert!(!remove(dir.path(), "nowhere", 1).unwrap());
}

#[derive(Clone)]
struct FixedClock(u64);

impl Clock for FixedClock {
    fn now(&self) -> std::time::Instant {
        std::time::Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        self.0
    }
}
