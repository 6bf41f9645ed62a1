// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Encryption key management: load/unload a dataset's key, change a key.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::argv::ZfsArgv;
use crate::error::RegistryError;
use crate::exec::{require_success, require_success_or_benign, run, run_with_stdin, ExecCtx};

/// Keys already loaded for `dataset_name` is not an error — the caller may
/// be retrying after a race with another client.
pub async fn load_key(
    dataset_name: &str,
    recursive: bool,
    key_location: Option<&str>,
    passphrase: Option<&str>,
    ctx: ExecCtx,
) -> Result<Value, RegistryError> {
    let mut builder = ZfsArgv::new("load-key").recursive(recursive);
    if let Some(location) = key_location {
        if location != "prompt" {
            builder = builder.keylocation(location);
        }
    }
    let argv = builder.target(dataset_name).into_inner();

    let output = match passphrase {
        Some(p) => run_with_stdin("zfs", argv.clone(), p, ctx).await?,
        None => run("zfs", argv.clone(), ctx).await?,
    };
    require_success_or_benign(&output, &argv, "load-key", format!("failed to load key for '{dataset_name}'"))?;
    Ok(Value::Null)
}

pub async fn unload_key(dataset_name: &str, recursive: bool, ctx: ExecCtx) -> Result<Value, RegistryError> {
    let argv = ZfsArgv::new("unload-key").recursive(recursive).target(dataset_name).into_inner();
    let output = run("zfs", argv.clone(), ctx).await?;
    require_success_or_benign(&output, &argv, "unload-key", format!("failed to unload key for '{dataset_name}'"))?;
    Ok(Value::Null)
}

/// Passphrase changes pass `passphrase_change_info` (`old\nnew`, or just
/// `new`) on stdin; keyfile changes pass `keyformat`/`keylocation`/
/// `pbkdf2iters` as `-o` options. Mirrors `change_key`'s two mutually
/// exclusive paths.
pub async fn change_key(
    dataset_name: &str,
    load_key_flag: bool,
    recursive: bool,
    options: &BTreeMap<String, String>,
    passphrase_change_info: Option<&str>,
    ctx: ExecCtx,
) -> Result<Value, RegistryError> {
    let mut builder = ZfsArgv::new("change-key").load_key(load_key_flag).recursive(recursive);

    let mut final_options = options.clone();
    if passphrase_change_info.is_some() {
        final_options.insert("keyformat".to_string(), "passphrase".to_string());
        if final_options.get("keylocation").map(String::as_str) == Some("prompt") {
            final_options.remove("keylocation");
        }
    } else if !final_options.is_empty() {
        let keylocation = final_options.get("keylocation").cloned().unwrap_or_default();
        if !keylocation.starts_with("file://") {
            return Err(RegistryError::Validation(
                "invalid options for keyfile change: 'keylocation' must be a file URI (file:///...)".to_string(),
            ));
        }
        match final_options.get("keyformat").map(String::as_str) {
            Some("raw") | Some("hex") => {}
            _ => {
                return Err(RegistryError::Validation(
                    "invalid options for keyfile change: 'keyformat' must be 'raw' or 'hex'".to_string(),
                ))
            }
        }
    }

    for (key, value) in &final_options {
        if matches!(key.as_str(), "keyformat" | "keylocation" | "pbkdf2iters") {
            builder = builder.property(key, value);
        } else {
            tracing::warn!(option = %key, "ignoring unknown option during change-key");
        }
    }
    let argv = builder.target(dataset_name).into_inner();

    let output = match passphrase_change_info {
        Some(info) => run_with_stdin("zfs", argv.clone(), info, ctx).await?,
        None => run("zfs", argv.clone(), ctx).await?,
    };
    require_success(&output, &argv, format!("failed to change key for '{dataset_name}'"))?;
    Ok(Value::Null)
}
