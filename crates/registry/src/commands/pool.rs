// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pool-level and vdev-level operations: create/destroy/import/export a
//! pool, attach/detach/replace/online/offline a device, add/remove a vdev,
//! split a pool, scrub, clear errors, set a property, and list pools
//! (including importable ones).

use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::argv::ZpoolArgv;
use crate::error::RegistryError;
use crate::exec::{require_success, require_success_or_benign, run, run_with_stdin, ExecCtx};
use crate::listing::{parse_scripted_table, ZPOOL_PROPS};
use crate::vdev_spec::{validate_all, RawVdevSpec};

pub async fn list_pools(ctx: ExecCtx) -> Result<Value, RegistryError> {
    let argv = ZpoolArgv::new("list").script(true).full_paths(true).output_props(ZPOOL_PROPS).into_inner();
    let output = run("zpool", argv.clone(), ctx).await?;
    require_success(&output, &argv, "failed to list pools")?;
    Ok(json!(parse_scripted_table(&output.stdout, ZPOOL_PROPS)))
}

/// Returns the raw `zpool status -v -P <pool>` text; structured parsing of
/// this output belongs to `zfdash-parser`, not the registry.
pub async fn get_pool_status_text(pool_name: &str, ctx: ExecCtx) -> Result<Value, RegistryError> {
    let argv = ZpoolArgv::new("status").verbose(true).full_paths(true).pool(pool_name).into_inner();
    let output = run("zpool", argv.clone(), ctx).await?;
    require_success(&output, &argv, format!("failed to get status for pool '{pool_name}'"))?;
    Ok(json!(output.stdout.trim()))
}

pub async fn create_pool(
    pool_name: &str,
    vdev_specs: &[RawVdevSpec],
    options: &BTreeMap<String, String>,
    force: bool,
    passphrase: Option<&str>,
    ctx: ExecCtx,
) -> Result<Value, RegistryError> {
    let validated = validate_all(vdev_specs, &format!("create_pool '{pool_name}'"))?;

    let mut builder = ZpoolArgv::new("create").force(force);
    builder = apply_create_options(builder, options, passphrase);
    builder = builder.pool(pool_name);
    let argv = builder.add_vdev_specs(&validated, &format!("create_pool '{pool_name}'"))?.into_inner();

    let output = match passphrase {
        Some(p) => run_with_stdin("zpool", argv.clone(), p, ctx).await?,
        None => run("zpool", argv.clone(), ctx).await?,
    };
    require_success(&output, &argv, format!("failed to create pool '{pool_name}'"))?;
    Ok(json!({ "pool": pool_name }))
}

fn apply_create_options(mut builder: ZpoolArgv, options: &BTreeMap<String, String>, passphrase: Option<&str>) -> ZpoolArgv {
    const FS_PROPS: &[&str] = &[
        "mountpoint", "encryption", "keyformat", "keylocation", "pbkdf2iters", "compression", "atime",
        "relatime", "readonly", "dedup", "sync", "logbias", "recordsize",
    ];
    const POOL_PROPS_O: &[&str] = &["altroot", "cachefile", "comment", "failmode"];

    let mut final_options = options.clone();
    if passphrase.is_some()
        && final_options.get("keylocation").map(String::as_str) == Some("prompt")
        && final_options.get("keyformat").map(String::as_str) == Some("passphrase")
    {
        final_options.remove("keylocation");
    }

    for (key, value) in &final_options {
        if FS_PROPS.contains(&key.as_str()) {
            builder = builder.fs_option(key, value);
        } else if POOL_PROPS_O.contains(&key.as_str()) {
            builder = builder.pool_option(key, value);
        } else {
            tracing::warn!(property = %key, "ignoring unknown option during pool creation");
        }
    }
    builder
}

pub async fn destroy_pool(pool_name: &str, force: bool, ctx: ExecCtx) -> Result<Value, RegistryError> {
    let argv = ZpoolArgv::new("destroy").force(force).pool(pool_name).into_inner();
    let output = run("zpool", argv.clone(), ctx).await?;
    require_success(&output, &argv, format!("failed to destroy pool '{pool_name}'"))?;
    Ok(Value::Null)
}

pub async fn import_pool(
    pool_name_or_id: Option<&str>,
    new_name: Option<&str>,
    force: bool,
    search_dirs: &[String],
    ctx: ExecCtx,
) -> Result<Value, RegistryError> {
    let mut builder = ZpoolArgv::new("import").force(force).search_dirs(search_dirs);

    let import_all = pool_name_or_id.is_none();
    if let Some(name) = pool_name_or_id {
        builder = builder.pool(name);
        if let Some(new_name) = new_name {
            builder = builder.pool(new_name);
        }
    } else {
        if new_name.is_some() {
            return Err(RegistryError::Validation(
                "cannot specify a new name when importing all pools (-a)".to_string(),
            ));
        }
        builder = builder.import_all(true);
    }
    let argv = builder.into_inner();

    let output = run("zpool", argv.clone(), ctx).await?;
    let target = if import_all { "all pools".to_string() } else { format!("pool '{}'", pool_name_or_id.unwrap_or_default()) };
    require_success(&output, &argv, format!("failed to import {target}"))?;
    Ok(Value::Null)
}

pub async fn export_pool(pool_name: &str, force: bool, ctx: ExecCtx) -> Result<Value, RegistryError> {
    let argv = ZpoolArgv::new("export").force(force).pool(pool_name).into_inner();
    let output = run("zpool", argv.clone(), ctx).await?;
    require_success(&output, &argv, format!("failed to export pool '{pool_name}'"))?;
    Ok(Value::Null)
}

pub async fn list_importable_pools(search_dirs: &[String], ctx: ExecCtx) -> Result<Value, RegistryError> {
    let argv = ZpoolArgv::new("import").search_dirs(search_dirs).into_inner();
    let output = run("zpool", argv.clone(), ctx).await?;

    if output.stderr.to_lowercase().contains("no pools available for import") {
        return Ok(json!([]));
    }
    require_success(&output, &argv, "failed to search for importable pools")?;
    if output.stdout.trim().is_empty() {
        return Ok(json!([]));
    }
    Ok(json!(output.stdout.trim()))
}

pub async fn set_pool_property(pool_name: &str, prop_name: &str, prop_value: &str, ctx: ExecCtx) -> Result<Value, RegistryError> {
    if prop_name.is_empty() || prop_name.contains('=') {
        return Err(RegistryError::Validation(format!("invalid property name: '{prop_name}'")));
    }
    let argv = ZpoolArgv::new("set").arg(&format!("{prop_name}={prop_value}")).pool(pool_name).into_inner();
    let output = run("zpool", argv.clone(), ctx).await?;
    require_success(&output, &argv, format!("failed to set property '{prop_name}' for pool '{pool_name}'"))?;
    Ok(Value::Null)
}

pub async fn scrub_pool(pool_name: &str, stop: bool, ctx: ExecCtx) -> Result<Value, RegistryError> {
    let argv = ZpoolArgv::new("scrub").stop_scrub(stop).pool(pool_name).into_inner();
    let output = run("zpool", argv.clone(), ctx).await?;
    let action = if stop { "stop" } else { "start" };
    require_success(&output, &argv, format!("failed to {action} scrub for pool '{pool_name}'"))?;
    Ok(Value::Null)
}

pub async fn clear_pool_errors(pool_name: &str, ctx: ExecCtx) -> Result<Value, RegistryError> {
    let argv = ZpoolArgv::new("clear").pool(pool_name).into_inner();
    let output = run("zpool", argv.clone(), ctx).await?;
    require_success(&output, &argv, format!("failed to clear errors for pool '{pool_name}'"))?;
    Ok(Value::Null)
}

pub async fn attach_device(pool_name: &str, existing_device: &str, new_device: &str, ctx: ExecCtx) -> Result<Value, RegistryError> {
    let argv = ZpoolArgv::new("attach").pool(pool_name).devices(&[existing_device, new_device]).into_inner();
    let output = run("zpool", argv.clone(), ctx).await?;
    require_success(&output, &argv, format!("failed to attach '{new_device}' to '{existing_device}' in pool '{pool_name}'"))?;
    Ok(Value::Null)
}

pub async fn detach_device(pool_name: &str, device: &str, ctx: ExecCtx) -> Result<Value, RegistryError> {
    let argv = ZpoolArgv::new("detach").pool(pool_name).device(device).into_inner();
    let output = run("zpool", argv.clone(), ctx).await?;
    require_success(&output, &argv, format!("failed to detach '{device}' from pool '{pool_name}'"))?;
    Ok(Value::Null)
}

pub async fn replace_device(pool_name: &str, old_device: &str, new_device: Option<&str>, ctx: ExecCtx) -> Result<Value, RegistryError> {
    let mut builder = ZpoolArgv::new("replace").pool(pool_name).device(old_device);
    if let Some(new_device) = new_device {
        builder = builder.device(new_device);
    }
    let argv = builder.into_inner();
    let output = run("zpool", argv.clone(), ctx).await?;
    let suffix = new_device.map(|d| format!(" with '{d}'")).unwrap_or_default();
    require_success(&output, &argv, format!("failed to replace '{old_device}'{suffix} in pool '{pool_name}'"))?;
    Ok(Value::Null)
}

pub async fn offline_device(pool_name: &str, device: &str, temporary: bool, ctx: ExecCtx) -> Result<Value, RegistryError> {
    let argv = ZpoolArgv::new("offline").temporary(temporary).pool(pool_name).device(device).into_inner();
    let output = run("zpool", argv.clone(), ctx).await?;
    require_success(&output, &argv, format!("failed to take '{device}' offline in pool '{pool_name}'"))?;
    Ok(Value::Null)
}

pub async fn online_device(pool_name: &str, device: &str, expand: bool, ctx: ExecCtx) -> Result<Value, RegistryError> {
    let argv = ZpoolArgv::new("online").expand(expand).pool(pool_name).device(device).into_inner();
    let output = run("zpool", argv.clone(), ctx).await?;
    require_success(&output, &argv, format!("failed to bring '{device}' online in pool '{pool_name}'"))?;
    Ok(Value::Null)
}

pub async fn add_vdev(pool_name: &str, vdev_specs: &[RawVdevSpec], force: bool, ctx: ExecCtx) -> Result<Value, RegistryError> {
    let validated = validate_all(vdev_specs, &format!("add_vdev '{pool_name}'"))?;
    let builder = ZpoolArgv::new("add").force(force).pool(pool_name);
    let argv = builder.add_vdev_specs(&validated, &format!("add_vdev '{pool_name}'"))?.into_inner();
    let output = run("zpool", argv.clone(), ctx).await?;
    require_success(&output, &argv, format!("failed to add vdev(s) to pool '{pool_name}'"))?;
    Ok(Value::Null)
}

/// On `is busy`/`i/o error`, calls for success with an
/// informational message rather than an error — the removal may complete
/// asynchronously once the device quiesces.
pub async fn remove_vdev(pool_name: &str, device_or_vdev_id: &str, ctx: ExecCtx) -> Result<Value, RegistryError> {
    let argv = ZpoolArgv::new("remove").pool(pool_name).device(device_or_vdev_id).into_inner();
    let output = run("zpool", argv.clone(), ctx).await?;
    let pending = require_success_or_benign(
        &output,
        &argv,
        "remove",
        format!("failed to remove '{device_or_vdev_id}' from pool '{pool_name}'"),
    )?;
    if pending {
        return Ok(json!({
            "pending": true,
            "message": format!("removal of '{device_or_vdev_id}' may be pending due to device activity or errors"),
        }));
    }
    Ok(Value::Null)
}

pub async fn split_pool(
    pool_name: &str,
    new_pool_name: &str,
    altroot: Option<&str>,
    dry_run: bool,
    pool_props: &BTreeMap<String, String>,
    fs_props: &BTreeMap<String, String>,
    ctx: ExecCtx,
) -> Result<Value, RegistryError> {
    let mut builder = ZpoolArgv::new("split").dry_run(dry_run);
    if let Some(altroot) = altroot {
        builder = builder.altroot(altroot);
    }
    for (key, value) in pool_props {
        builder = builder.pool_option(key, value);
    }
    for (key, value) in fs_props {
        builder = builder.fs_option(key, value);
    }
    let argv = builder.pools(&[pool_name, new_pool_name]).into_inner();
    let output = run("zpool", argv.clone(), ctx).await?;
    require_success(&output, &argv, format!("failed to split pool '{pool_name}' into '{new_pool_name}'"))?;
    Ok(Value::Null)
}
