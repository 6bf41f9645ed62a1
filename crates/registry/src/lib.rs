// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! zfdash-registry: the command registry.
//!
//! Commands are a tagged `enum Command` rather than stringly-keyed dynamic
//! dispatch with free-form kwargs: the untyped wire envelope
//! (`{command, args, kwargs}`) is deserialized into this enum once, at the
//! edge, by reconstructing a single JSON object (`{"command": <name>,
//! ...kwargs}`) and feeding it to `Command`'s internally-tagged
//! `Deserialize` impl. Positional `args` are not used by any handler here
//! — every registry-owned command takes its parameters by name.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod argv;
pub mod commands;
pub mod error;
pub mod exec;
pub mod listing;
pub mod outcome;
pub mod vdev_spec;

pub use error::RegistryError;
pub use exec::ExecCtx;
pub use vdev_spec::RawVdevSpec;

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// Every operation this crate knows how to run against `zfs`/`zpool`,
/// tagged by the exact command name used on the wire (/// `{"command": <string>, ...}` request shape).
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    ListPools,
    CreatePool {
        pool_name: String,
        vdev_specs: Vec<RawVdevSpec>,
        #[serde(default)]
        options: BTreeMap<String, String>,
        #[serde(default)]
        force: bool,
        #[serde(default)]
        passphrase: Option<String>,
    },
    DestroyPool {
        pool_name: String,
        #[serde(default)]
        force: bool,
    },
    ImportPool {
        #[serde(default)]
        pool_name_or_id: Option<String>,
        #[serde(default)]
        new_name: Option<String>,
        #[serde(default)]
        force: bool,
        #[serde(default)]
        search_dirs: Vec<String>,
    },
    ExportPool {
        pool_name: String,
        #[serde(default)]
        force: bool,
    },
    ListImportablePools {
        #[serde(default)]
        search_dirs: Vec<String>,
    },
    SetPoolProperty {
        pool_name: String,
        prop_name: String,
        prop_value: String,
    },
    ScrubPool {
        pool_name: String,
        #[serde(default)]
        stop: bool,
    },
    ClearPoolErrors {
        pool_name: String,
    },
    AttachDevice {
        pool_name: String,
        existing_device: String,
        new_device: String,
    },
    DetachDevice {
        pool_name: String,
        device: String,
    },
    ReplaceDevice {
        pool_name: String,
        old_device: String,
        #[serde(default)]
        new_device: Option<String>,
    },
    OfflineDevice {
        pool_name: String,
        device: String,
        #[serde(default)]
        temporary: bool,
    },
    OnlineDevice {
        pool_name: String,
        device: String,
        #[serde(default)]
        expand: bool,
    },
    AddVdev {
        pool_name: String,
        vdev_specs: Vec<RawVdevSpec>,
        #[serde(default)]
        force: bool,
    },
    RemoveVdev {
        pool_name: String,
        device_or_vdev_id: String,
    },
    SplitPool {
        pool_name: String,
        new_pool_name: String,
        #[serde(default)]
        altroot: Option<String>,
        #[serde(default)]
        dry_run: bool,
        #[serde(default)]
        pool_props: BTreeMap<String, String>,
        #[serde(default)]
        fs_props: BTreeMap<String, String>,
    },
    ListDatasets,
    ListSnapshots {
        #[serde(default)]
        dataset_name: Option<String>,
    },
    CreateDataset {
        full_dataset_name: String,
        #[serde(default)]
        is_volume: bool,
        #[serde(default)]
        volsize: Option<String>,
        #[serde(default)]
        options: BTreeMap<String, String>,
        #[serde(default)]
        passphrase: Option<String>,
    },
    DestroyDataset {
        full_dataset_name: String,
        #[serde(default)]
        recursive: bool,
    },
    RenameDataset {
        old_name: String,
        new_name: String,
        #[serde(default)]
        recursive: bool,
        #[serde(default)]
        force_unmount: bool,
    },
    SetDatasetProperty {
        full_dataset_name: String,
        prop_name: String,
        prop_value: String,
    },
    InheritDatasetProperty {
        full_dataset_name: String,
        prop_name: String,
    },
    MountDataset {
        full_dataset_name: String,
    },
    UnmountDataset {
        full_dataset_name: String,
    },
    CreateSnapshot {
        full_dataset_name: String,
        snapshot_name: String,
        #[serde(default)]
        recursive: bool,
    },
    DestroySnapshot {
        full_snapshot_name: String,
    },
    RollbackSnapshot {
        full_snapshot_name: String,
    },
    CloneSnapshot {
        full_snapshot_name: String,
        target_dataset_name: String,
        #[serde(default)]
        options: BTreeMap<String, String>,
    },
    PromoteDataset {
        full_dataset_name: String,
    },
    LoadKey {
        dataset_name: String,
        #[serde(default)]
        recursive: bool,
        #[serde(default)]
        key_location: Option<String>,
        #[serde(default)]
        passphrase: Option<String>,
    },
    UnloadKey {
        dataset_name: String,
        #[serde(default)]
        recursive: bool,
    },
    ChangeKey {
        dataset_name: String,
        #[serde(default)]
        load_key: bool,
        #[serde(default)]
        recursive: bool,
        #[serde(default)]
        options: BTreeMap<String, String>,
        #[serde(default)]
        passphrase_change_info: Option<String>,
    },
}

/// Every wire-level command name this registry recognizes, in the same
/// order as the `Command` variants above. The daemon dispatcher consults
/// this before calling [`Command::from_envelope`] so it can tell
/// `UnknownCommand` apart from `ValidationFailure`: an
/// unrecognized name never reaches `from_envelope` at all.
pub const COMMAND_NAMES: &[&str] = &[
    "list_pools",
    "create_pool",
    "destroy_pool",
    "import_pool",
    "export_pool",
    "list_importable_pools",
    "set_pool_property",
    "scrub_pool",
    "clear_pool_errors",
    "attach_device",
    "detach_device",
    "replace_device",
    "offline_device",
    "online_device",
    "add_vdev",
    "remove_vdev",
    "split_pool",
    "list_datasets",
    "list_snapshots",
    "create_dataset",
    "destroy_dataset",
    "rename_dataset",
    "set_dataset_property",
    "inherit_dataset_property",
    "mount_dataset",
    "unmount_dataset",
    "create_snapshot",
    "destroy_snapshot",
    "rollback_snapshot",
    "clone_snapshot",
    "promote_dataset",
    "load_key",
    "unload_key",
    "change_key",
];

impl Command {
    /// True if `name` is one of [`COMMAND_NAMES`] — a command this crate
    /// can dispatch, as opposed to one the daemon handles itself
    /// (`shutdown_daemon`, `get_pool_status`, `list_block_devices`) or
    /// doesn't recognize at all.
    pub fn is_known(name: &str) -> bool {
        COMMAND_NAMES.contains(&name)
    }

    /// Reconstruct a `Command` from the untyped wire envelope: the request's
    /// `command` name plus its `kwargs` object, merged into one tagged JSON
    /// value and deserialized in a single step.
    pub fn from_envelope(
        command: &str,
        kwargs: &serde_json::Map<String, Value>,
    ) -> Result<Self, RegistryError> {
        let mut object = kwargs.clone();
        object.insert("command".to_string(), Value::String(command.to_string()));
        serde_json::from_value(Value::Object(object))
            .map_err(|e| RegistryError::Validation(format!("invalid arguments for '{command}': {e}")))
    }

    /// Run the command to completion, producing the `data` payload of a
    /// successful response.
    pub async fn dispatch(self, ctx: ExecCtx) -> Result<Value, RegistryError> {
        use commands::{dataset, key, pool};

        match self {
            Command::ListPools => pool::list_pools(ctx).await,
            Command::CreatePool { pool_name, vdev_specs, options, force, passphrase } => {
                pool::create_pool(&pool_name, &vdev_specs, &options, force, passphrase.as_deref(), ctx).await
            }
            Command::DestroyPool { pool_name, force } => pool::destroy_pool(&pool_name, force, ctx).await,
            Command::ImportPool { pool_name_or_id, new_name, force, search_dirs } => {
                pool::import_pool(pool_name_or_id.as_deref(), new_name.as_deref(), force, &search_dirs, ctx).await
            }
            Command::ExportPool { pool_name, force } => pool::export_pool(&pool_name, force, ctx).await,
            Command::ListImportablePools { search_dirs } => pool::list_importable_pools(&search_dirs, ctx).await,
            Command::SetPoolProperty { pool_name, prop_name, prop_value } => {
                pool::set_pool_property(&pool_name, &prop_name, &prop_value, ctx).await
            }
            Command::ScrubPool { pool_name, stop } => pool::scrub_pool(&pool_name, stop, ctx).await,
            Command::ClearPoolErrors { pool_name } => pool::clear_pool_errors(&pool_name, ctx).await,
            Command::AttachDevice { pool_name, existing_device, new_device } => {
                pool::attach_device(&pool_name, &existing_device, &new_device, ctx).await
            }
            Command::DetachDevice { pool_name, device } => pool::detach_device(&pool_name, &device, ctx).await,
            Command::ReplaceDevice { pool_name, old_device, new_device } => {
                pool::replace_device(&pool_name, &old_device, new_device.as_deref(), ctx).await
            }
            Command::OfflineDevice { pool_name, device, temporary } => {
                pool::offline_device(&pool_name, &device, temporary, ctx).await
            }
            Command::OnlineDevice { pool_name, device, expand } => {
                pool::online_device(&pool_name, &device, expand, ctx).await
            }
            Command::AddVdev { pool_name, vdev_specs, force } => {
                pool::add_vdev(&pool_name, &vdev_specs, force, ctx).await
            }
            Command::RemoveVdev { pool_name, device_or_vdev_id } => {
                pool::remove_vdev(&pool_name, &device_or_vdev_id, ctx).await
            }
            Command::SplitPool { pool_name, new_pool_name, altroot, dry_run, pool_props, fs_props } => {
                pool::split_pool(&pool_name, &new_pool_name, altroot.as_deref(), dry_run, &pool_props, &fs_props, ctx)
                    .await
            }
            Command::ListDatasets => dataset::list_datasets(ctx).await,
            Command::ListSnapshots { dataset_name } => dataset::list_snapshots(dataset_name.as_deref(), ctx).await,
            Command::CreateDataset { full_dataset_name, is_volume, volsize, options, passphrase } => {
                dataset::create_dataset(&full_dataset_name, is_volume, volsize.as_deref(), &options, passphrase.as_deref(), ctx)
                    .await
            }
            Command::DestroyDataset { full_dataset_name, recursive } => {
                dataset::destroy_dataset(&full_dataset_name, recursive, ctx).await
            }
            Command::RenameDataset { old_name, new_name, recursive, force_unmount } => {
                dataset::rename_dataset(&old_name, &new_name, recursive, force_unmount, ctx).await
            }
            Command::SetDatasetProperty { full_dataset_name, prop_name, prop_value } => {
                dataset::set_dataset_property(&full_dataset_name, &prop_name, &prop_value, ctx).await
            }
            Command::InheritDatasetProperty { full_dataset_name, prop_name } => {
                dataset::inherit_dataset_property(&full_dataset_name, &prop_name, ctx).await
            }
            Command::MountDataset { full_dataset_name } => dataset::mount_dataset(&full_dataset_name, ctx).await,
            Command::UnmountDataset { full_dataset_name } => dataset::unmount_dataset(&full_dataset_name, ctx).await,
            Command::CreateSnapshot { full_dataset_name, snapshot_name, recursive } => {
                dataset::create_snapshot(&full_dataset_name, &snapshot_name, recursive, ctx).await
            }
            Command::DestroySnapshot { full_snapshot_name } => dataset::destroy_snapshot(&full_snapshot_name, ctx).await,
            Command::RollbackSnapshot { full_snapshot_name } => dataset::rollback_snapshot(&full_snapshot_name, ctx).await,
            Command::CloneSnapshot { full_snapshot_name, target_dataset_name, options } => {
                dataset::clone_snapshot(&full_snapshot_name, &target_dataset_name, &options, ctx).await
            }
            Command::PromoteDataset { full_dataset_name } => dataset::promote_dataset(&full_dataset_name, ctx).await,
            Command::LoadKey { dataset_name, recursive, key_location, passphrase } => {
                key::load_key(&dataset_name, recursive, key_location.as_deref(), passphrase.as_deref(), ctx).await
            }
            Command::UnloadKey { dataset_name, recursive } => key::unload_key(&dataset_name, recursive, ctx).await,
            Command::ChangeKey { dataset_name, load_key, recursive, options, passphrase_change_info } => {
                key::change_key(&dataset_name, load_key, recursive, &options, passphrase_change_info.as_deref(), ctx).await
            }
        }
    }
}
