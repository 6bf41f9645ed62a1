// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn short_output_is_not_truncated() {
    let (out, truncated) = truncate_for_audit("zpool status -v\n");
    assert_eq!(out, "zpool status -v\n");
    assert!(!truncated);
}

#[test]
fn long_output_is_truncated_with_marker() {
    let long = "a".repeat(TRUNCATE_LIMIT_BYTES + 100);
    let (out, truncated) = truncate_for_audit(&long);
    assert!(truncated);
    assert!(out.ends_with(TRUNCATE_MARKER));
    assert!(out.len() <= TRUNCATE_LIMIT_BYTES + TRUNCATE_MARKER.len());
}

#[test]
fn truncation_respects_utf8_boundaries() {
    let mut long = "x".repeat(TRUNCATE_LIMIT_BYTES - 1);
    long.push('€'); // 3-byte UTF-8 char straddling the cutoff
    long.push_str(&"y".repeat(50));
    let (out, truncated) = truncate_for_audit(&long);
    assert!(truncated);
    assert!(out.is_char_boundary(out.len() - TRUNCATE_MARKER.len()));
}

#[tokio::test]
async fn append_writes_one_json_line_per_entry() {
    let dir = tempfile::tempdir().unwrap();
    let logger = AuditLogger::at_path(dir.path().join("audit.log"));

    let entry = AuditEntry {
        ts_ms: 1_700_000_000_000,
        argv: "zpool status -j -P".to_string(),
        stdin_present: false,
        return_code: 0,
        duration_ms: 42,
        stdout_truncated: false,
        stderr_truncated: false,
    };
    logger.append(&entry).await.unwrap();
    logger.append(&entry).await.unwrap();

    let contents = tokio::fs::read_to_string(logger.path()).await.unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        let decoded: AuditEntry = serde_json::from_str(line).unwrap();
        assert_eq!(decoded, entry);
    }
}

#[tokio::test]
async fn append_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a/b/c/audit.log");
    let logger = AuditLogger::at_path(&nested);
    let entry = AuditEntry {
        ts_ms: 1,
        argv: "zfs list".to_string(),
        stdin_present: false,
        return_code: 0,
        duration_ms: 1,
        stdout_truncated: false,
        stderr_truncated: false,
    };
    logger.append(&entry).await.unwrap();
    assert!(nested.exists());
}
