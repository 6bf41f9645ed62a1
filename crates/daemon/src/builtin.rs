// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Commands the daemon answers itself rather than handing to
//! `zfdash-registry`: `get_pool_status` (parser + runner, ),
//! `list_block_devices` (the enumerator, ), `change_password`
//! (credential store, "password-change endpoint"), and
//! `shutdown_daemon` (handled synchronously by [`crate::dispatch`] itself,
//! never reaching this module).

use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::OnceCell;

use zfdash_core::error::DaemonError;
use zfdash_core::PoolStatus;
use zfdash_registry::ExecCtx;

use crate::credential_store::CredentialStore;

pub const BUILTIN_COMMAND_NAMES: &[&str] = &["get_pool_status", "list_block_devices", "change_password"];

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_COMMAND_NAMES.contains(&name)
}

#[derive(Debug, Deserialize)]
struct GetPoolStatusArgs {
    #[serde(default)]
    pool_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChangePasswordArgs {
    username: String,
    new_password: String,
}

/// Dispatch one of [`BUILTIN_COMMAND_NAMES`]. Caller (the dispatcher) has
/// already checked `is_builtin(name)` is true.
pub async fn dispatch(
    name: &str,
    kwargs: &serde_json::Map<String, Value>,
    ctx: ExecCtx,
    credentials: &CredentialStore,
    zpool_legacy_cache: &OnceCell<bool>,
) -> Result<Value, DaemonError> {
    match name {
        "get_pool_status" => get_pool_status(kwargs, ctx, zpool_legacy_cache).await,
        "list_block_devices" => list_block_devices().await,
        "change_password" => change_password(kwargs, credentials).await,
        other => Err(DaemonError::UnknownCommand(other.to_string())),
    }
}

async fn get_pool_status(
    kwargs: &serde_json::Map<String, Value>,
    ctx: ExecCtx,
    zpool_legacy_cache: &OnceCell<bool>,
) -> Result<Value, DaemonError> {
    let args: GetPoolStatusArgs = serde_json::from_value(Value::Object(kwargs.clone()))
        .map_err(|e| DaemonError::ValidationFailure { message: format!("invalid arguments for 'get_pool_status': {e}") })?;

    let raw = zfdash_registry::commands::pool::get_pool_status_text(
        args.pool_name.as_deref().unwrap_or(""),
        ctx,
    )
    .await?;

    let raw_text = raw.as_str().unwrap_or_default();
    let use_legacy = *zpool_legacy_cache.get_or_init(|| zpool_needs_legacy(ctx)).await;

    let statuses: Vec<PoolStatus> = zfdash_parser::parse_status(raw_text, args.pool_name.as_deref(), use_legacy)
        .map_err(DaemonError::from)?;

    Ok(json!(statuses))
}

/// Probe `zpool --version` to decide JSON-vs-legacy mode. Called at most
/// once per process lifetime through the `OnceCell` threaded in from
/// [`crate::dispatch::DispatchState`].
async fn zpool_needs_legacy(ctx: ExecCtx) -> bool {
    match zfdash_registry::exec::run("zpool", vec!["--version".to_string()], ctx).await {
        Ok(output) => zfdash_parser::needs_legacy_parser(&output.stdout),
        Err(_) => true,
    }
}

async fn list_block_devices() -> Result<Value, DaemonError> {
    let result = zfdash_enumerator::list_block_devices().await;
    Ok(json!(result))
}

async fn change_password(kwargs: &serde_json::Map<String, Value>, credentials: &CredentialStore) -> Result<Value, DaemonError> {
    let args: ChangePasswordArgs = serde_json::from_value(Value::Object(kwargs.clone()))
        .map_err(|e| DaemonError::ValidationFailure { message: format!("invalid arguments for 'change_password': {e}") })?;

    if args.new_password.is_empty() {
        return Err(DaemonError::ValidationFailure { message: "new_password must not be empty".to_string() });
    }

    credentials
        .upsert_password("0", &args.username, &args.new_password)
        .await
        .map_err(|e| DaemonError::InternalError(e.to_string()))?;

    Ok(json!("password updated"))
}

#[cfg(test)]
#[path = "builtin_tests.rs"]
mod tests;
