// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dataset/snapshot operations: mount/unmount, create/destroy/rename a
//! dataset, set/inherit a property, create/destroy/rollback/clone/promote
//! a snapshot, and list datasets or snapshots.

use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::argv::ZfsArgv;
use crate::error::RegistryError;
use crate::exec::{require_success, require_success_or_benign, run, run_with_stdin, ExecCtx};
use crate::listing::{parse_scripted_table, ZFS_DATASET_PROPS, ZFS_SNAPSHOT_PROPS};

pub async fn list_datasets(ctx: ExecCtx) -> Result<Value, RegistryError> {
    let argv = ZfsArgv::new("list")
        .script(true)
        .recursive(true)
        .output_props(ZFS_DATASET_PROPS)
        .dataset_type("filesystem,volume")
        .into_inner();
    let output = run("zfs", argv.clone(), ctx).await?;
    require_success(&output, &argv, "failed to list datasets and volumes")?;
    Ok(json!(parse_scripted_table(&output.stdout, ZFS_DATASET_PROPS)))
}

pub async fn list_snapshots(dataset_name: Option<&str>, ctx: ExecCtx) -> Result<Value, RegistryError> {
    let mut builder = ZfsArgv::new("list").script(true).recursive(true).output_props(ZFS_SNAPSHOT_PROPS).dataset_type("snapshot");
    if let Some(name) = dataset_name {
        builder = builder.target(name);
    }
    let argv = builder.into_inner();
    let output = run("zfs", argv.clone(), ctx).await?;
    require_success(&output, &argv, "failed to list snapshots")?;
    Ok(json!(parse_scripted_table(&output.stdout, ZFS_SNAPSHOT_PROPS)))
}

pub async fn create_dataset(
    full_dataset_name: &str,
    is_volume: bool,
    volsize: Option<&str>,
    options: &BTreeMap<String, String>,
    passphrase: Option<&str>,
    ctx: ExecCtx,
) -> Result<Value, RegistryError> {
    let mut builder = ZfsArgv::new("create");
    if is_volume {
        let volsize = volsize.ok_or_else(|| RegistryError::Validation("volume size (-V) is required for creating ZFS volumes".to_string()))?;
        builder = builder.volsize(volsize);
    }

    let mut final_options = options.clone();
    if passphrase.is_some()
        && final_options.get("keylocation").map(String::as_str) == Some("prompt")
        && final_options.get("keyformat").map(String::as_str) == Some("passphrase")
    {
        final_options.remove("keylocation");
    }
    for (key, value) in &final_options {
        builder = builder.property(key, value);
    }
    let argv = builder.target(full_dataset_name).into_inner();

    let output = match passphrase {
        Some(p) => run_with_stdin("zfs", argv.clone(), p, ctx).await?,
        None => run("zfs", argv.clone(), ctx).await?,
    };
    require_success(&output, &argv, format!("failed to create dataset '{full_dataset_name}'"))?;
    Ok(json!({ "name": full_dataset_name }))
}

pub async fn destroy_dataset(full_dataset_name: &str, recursive: bool, ctx: ExecCtx) -> Result<Value, RegistryError> {
    let argv = ZfsArgv::new("destroy").recursive(recursive).force(recursive).target(full_dataset_name).into_inner();
    let output = run("zfs", argv.clone(), ctx).await?;
    require_success(&output, &argv, format!("failed to destroy '{full_dataset_name}'"))?;
    Ok(Value::Null)
}

pub async fn rename_dataset(old_name: &str, new_name: &str, recursive: bool, force_unmount: bool, ctx: ExecCtx) -> Result<Value, RegistryError> {
    let argv = ZfsArgv::new("rename").recursive(recursive).force(force_unmount).targets(&[old_name, new_name]).into_inner();
    let output = run("zfs", argv.clone(), ctx).await?;
    require_success(&output, &argv, format!("failed to rename '{old_name}' to '{new_name}'"))?;
    Ok(Value::Null)
}

pub async fn set_dataset_property(full_dataset_name: &str, prop_name: &str, prop_value: &str, ctx: ExecCtx) -> Result<Value, RegistryError> {
    if prop_name.is_empty() || prop_name.contains('=') {
        return Err(RegistryError::Validation(format!("invalid property name: '{prop_name}'")));
    }
    let argv = ZfsArgv::new("set").targets(&[&format!("{prop_name}={prop_value}"), full_dataset_name]).into_inner();
    let output = run("zfs", argv.clone(), ctx).await?;
    require_success(&output, &argv, format!("failed to set property '{prop_name}' for '{full_dataset_name}'"))?;
    Ok(Value::Null)
}

pub async fn inherit_dataset_property(full_dataset_name: &str, prop_name: &str, ctx: ExecCtx) -> Result<Value, RegistryError> {
    if prop_name.is_empty() {
        return Err(RegistryError::Validation("invalid property name: cannot be empty".to_string()));
    }
    let argv = ZfsArgv::new("inherit").targets(&[prop_name, full_dataset_name]).into_inner();
    let output = run("zfs", argv.clone(), ctx).await?;
    require_success(&output, &argv, format!("failed to inherit property '{prop_name}' for '{full_dataset_name}'"))?;
    Ok(Value::Null)
}

/// Mounting an already-mounted dataset, or one whose encryption key isn't
/// loaded yet (key loading is a separate client-driven step), is not an
/// error.
pub async fn mount_dataset(full_dataset_name: &str, ctx: ExecCtx) -> Result<Value, RegistryError> {
    let argv = ZfsArgv::new("mount").target(full_dataset_name).into_inner();
    let output = run("zfs", argv.clone(), ctx).await?;
    require_success_or_benign(&output, &argv, "mount", format!("failed to mount dataset '{full_dataset_name}'"))?;
    Ok(Value::Null)
}

pub async fn unmount_dataset(full_dataset_name: &str, ctx: ExecCtx) -> Result<Value, RegistryError> {
    let argv = ZfsArgv::new("unmount").target(full_dataset_name).into_inner();
    let output = run("zfs", argv.clone(), ctx).await?;
    require_success_or_benign(&output, &argv, "unmount", format!("failed to unmount dataset '{full_dataset_name}'"))?;
    Ok(Value::Null)
}

pub async fn create_snapshot(full_dataset_name: &str, snapshot_name: &str, recursive: bool, ctx: ExecCtx) -> Result<Value, RegistryError> {
    if snapshot_name.contains('@') {
        return Err(RegistryError::Validation("snapshot name should not contain '@'".to_string()));
    }
    let full_snapshot_name = format!("{full_dataset_name}@{snapshot_name}");
    let argv = ZfsArgv::new("snapshot").recursive(recursive).target(&full_snapshot_name).into_inner();
    let output = run("zfs", argv.clone(), ctx).await?;
    require_success(&output, &argv, format!("failed to create snapshot '{full_snapshot_name}'"))?;
    Ok(json!({ "name": full_snapshot_name }))
}

pub async fn destroy_snapshot(full_snapshot_name: &str, ctx: ExecCtx) -> Result<Value, RegistryError> {
    if !full_snapshot_name.contains('@') {
        return Err(RegistryError::Validation("invalid snapshot name format (missing '@')".to_string()));
    }
    let argv = ZfsArgv::new("destroy").target(full_snapshot_name).into_inner();
    let output = run("zfs", argv.clone(), ctx).await?;
    require_success(&output, &argv, format!("failed to destroy snapshot '{full_snapshot_name}'"))?;
    Ok(Value::Null)
}

pub async fn rollback_snapshot(full_snapshot_name: &str, ctx: ExecCtx) -> Result<Value, RegistryError> {
    if !full_snapshot_name.contains('@') {
        return Err(RegistryError::Validation("invalid snapshot name format (missing '@')".to_string()));
    }
    let argv = ZfsArgv::new("rollback").recursive(true).force(true).target(full_snapshot_name).into_inner();
    let output = run("zfs", argv.clone(), ctx).await?;
    require_success(&output, &argv, format!("failed to rollback to '{full_snapshot_name}'"))?;
    Ok(Value::Null)
}

pub async fn clone_snapshot(
    full_snapshot_name: &str,
    target_dataset_name: &str,
    options: &BTreeMap<String, String>,
    ctx: ExecCtx,
) -> Result<Value, RegistryError> {
    if !full_snapshot_name.contains('@') {
        return Err(RegistryError::Validation("invalid snapshot name format (missing '@')".to_string()));
    }
    let mut builder = ZfsArgv::new("clone");
    for (key, value) in options {
        builder = builder.property(key, value);
    }
    let argv = builder.targets(&[full_snapshot_name, target_dataset_name]).into_inner();
    let output = run("zfs", argv.clone(), ctx).await?;
    require_success(&output, &argv, format!("failed to clone snapshot '{full_snapshot_name}' to '{target_dataset_name}'"))?;
    Ok(Value::Null)
}

pub async fn promote_dataset(full_dataset_name: &str, ctx: ExecCtx) -> Result<Value, RegistryError> {
    let argv = ZfsArgv::new("promote").target(full_dataset_name).into_inner();
    let output = run("zfs", argv.clone(), ctx).await?;
    require_success(&output, &argv, format!("failed to promote dataset '{full_dataset_name}'"))?;
    Ok(Value::Null)
}
