// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn hash_then_verify_round_trips() {
    let info = hash_password("correct horse battery staple", PasswordInfo::MIN_ITERATIONS);
    assert!(verify_password("correct horse battery staple", &info).unwrap());
    assert!(!verify_password("wrong password", &info).unwrap());
}

#[tokio::test]
async fn create_default_if_missing_only_seeds_once() {
    let dir = tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("credentials.json"));

    assert!(store.create_default_if_missing("admin", "hunter2").await.unwrap());
    assert!(!store.create_default_if_missing("admin", "different").await.unwrap());

    let entry = store.find_by_username("admin").await.unwrap().expect("seeded entry");
    assert!(verify_password("hunter2", &entry.password).unwrap());
}

#[tokio::test]
async fn upsert_password_replaces_existing_entry() {
    let dir = tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("credentials.json"));

    store.upsert_password("0", "admin", "first").await.unwrap();
    store.upsert_password("0", "admin", "second").await.unwrap();

    let entries = store.load().await.unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries["0"];
    assert!(verify_password("second", &entry.password).unwrap());
    assert!(!verify_password("first", &entry.password).unwrap());
}

#[tokio::test]
async fn missing_file_loads_as_empty_store() {
    let dir = tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("does-not-exist.json"));
    assert!(store.load().await.unwrap().is_empty());
}
