// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fluent argv builders for `zfs`/`zpool`. Each builder method appends
//! exactly the flag (and, where applicable, its value) a handler asks for,
//! guaranteeing options precede positional targets simply by building
//! left to right.
//!
//! The builders only ever produce `argv[1..]` (the action word and its
//! flags/targets); `argv[0]` is the discovered binary path, supplied by the
//! caller when constructing the final [`zfdash_runner::CommandSpec`].

use crate::error::RegistryError;
use crate::vdev_spec::ValidatedVdev;

/// Shared flag-building logic between the `zfs` and `zpool` builders.
macro_rules! argv_builder {
    ($name:ident) => {
        #[derive(Debug, Clone)]
        pub struct $name {
            parts: Vec<String>,
        }

        impl $name {
            pub fn new(action: &str) -> Self {
                Self { parts: vec![action.to_string()] }
            }

            fn flag(mut self, flag: &str, on: bool) -> Self {
                if on {
                    self.parts.push(flag.to_string());
                }
                self
            }

            fn option(mut self, flag: &str, value: &str) -> Self {
                self.parts.push(flag.to_string());
                self.parts.push(value.to_string());
                self
            }

            fn key_value(mut self, flag: &str, key: &str, value: &str) -> Self {
                self.parts.push(flag.to_string());
                self.parts.push(format!("{key}={value}"));
                self
            }

            pub fn arg(mut self, value: &str) -> Self {
                self.parts.push(value.to_string());
                self
            }

            pub fn args(mut self, values: &[&str]) -> Self {
                self.parts.extend(values.iter().map(|v| v.to_string()));
                self
            }

            pub fn into_inner(self) -> Vec<String> {
                self.parts
            }
        }
    };
}

argv_builder!(ZfsArgv);
argv_builder!(ZpoolArgv);

impl ZfsArgv {
    pub fn recursive(self, on: bool) -> Self {
        self.flag("-r", on)
    }
    pub fn force(self, on: bool) -> Self {
        self.flag("-f", on)
    }
    pub fn parsable(self, on: bool) -> Self {
        self.flag("-p", on)
    }
    /// `-H`: no header, tab-separated — the scriptable output mode every
    /// list-type command runs in.
    pub fn script(self, on: bool) -> Self {
        self.flag("-H", on)
    }
    pub fn dataset_type(self, types: &str) -> Self {
        self.option("-t", types)
    }
    pub fn output_props(self, props: &[&str]) -> Self {
        self.option("-o", &props.join(","))
    }
    pub fn property(self, key: &str, value: &str) -> Self {
        self.key_value("-o", key, value)
    }
    pub fn volsize(self, size: &str) -> Self {
        self.option("-V", size)
    }
    pub fn keylocation(self, location: &str) -> Self {
        self.option("-L", location)
    }
    /// `-l`: load the key as part of `change-key`.
    pub fn load_key(self, on: bool) -> Self {
        self.flag("-l", on)
    }
    pub fn target(self, name: &str) -> Self {
        self.arg(name)
    }
    pub fn targets(self, names: &[&str]) -> Self {
        self.args(names)
    }
}

impl ZpoolArgv {
    pub fn force(self, on: bool) -> Self {
        self.flag("-f", on)
    }
    /// `-P`: show full device paths rather than basenames.
    pub fn full_paths(self, on: bool) -> Self {
        self.flag("-P", on)
    }
    pub fn script(self, on: bool) -> Self {
        self.flag("-H", on)
    }
    pub fn verbose(self, on: bool) -> Self {
        self.flag("-v", on)
    }
    pub fn output_props(self, props: &[&str]) -> Self {
        self.option("-o", &props.join(","))
    }
    pub fn pool_option(self, key: &str, value: &str) -> Self {
        self.key_value("-o", key, value)
    }
    pub fn fs_option(self, key: &str, value: &str) -> Self {
        self.key_value("-O", key, value)
    }
    pub fn search_dir(self, dir: &str) -> Self {
        self.option("-d", dir)
    }
    pub fn search_dirs(mut self, dirs: &[String]) -> Self {
        for dir in dirs {
            self = self.option("-d", dir);
        }
        self
    }
    pub fn pool(self, name: &str) -> Self {
        self.arg(name)
    }
    pub fn pools(self, names: &[&str]) -> Self {
        self.args(names)
    }
    pub fn device(self, name: &str) -> Self {
        self.arg(name)
    }
    pub fn devices(self, names: &[&str]) -> Self {
        self.args(names)
    }
    pub fn import_all(self, on: bool) -> Self {
        self.flag("-a", on)
    }
    pub fn temporary(self, on: bool) -> Self {
        self.flag("-t", on)
    }
    pub fn expand(self, on: bool) -> Self {
        self.flag("-e", on)
    }
    pub fn stop_scrub(self, on: bool) -> Self {
        self.flag("-s", on)
    }
    pub fn dry_run(self, on: bool) -> Self {
        self.flag("-n", on)
    }
    pub fn altroot(self, path: &str) -> Self {
        self.option("-R", path)
    }

    /// Append a validated set of vdev specs (already checked by
    /// [`crate::vdev_spec::validate_all`]): each non-`disk` type word (which
    /// may itself be multi-word, e.g. `special mirror`) precedes its device
    /// list.
    pub fn add_vdev_specs(mut self, specs: &[ValidatedVdev], context: &str) -> Result<Self, RegistryError> {
        if specs.is_empty() {
            return Err(RegistryError::Validation(format!(
                "cannot proceed with {context}: no valid devices specified"
            )));
        }
        for vdev in specs {
            if vdev.kind != "disk" {
                for word in vdev.kind.split_whitespace() {
                    self = self.arg(word);
                }
            }
            let devices: Vec<&str> = vdev.devices.iter().map(String::as_str).collect();
            self = self.devices(&devices);
        }
        Ok(self)
    }
}

#[cfg(test)]
#[path = "argv_tests.rs"]
mod tests;
