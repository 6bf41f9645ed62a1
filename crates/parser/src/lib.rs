// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! zfdash-parser: turns `zpool status` output (JSON or legacy text) into the
//! canonical `VdevNode`/`PoolStatus` tree shared across the wire.
//!
//! Pure string-in/struct-out: no I/O of its own. Callers decide which mode
//! to invoke and feed in already-captured command output.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod json_mode;
mod text_mode;
mod version;

pub use json_mode::parse_status_json;
pub use text_mode::parse_status_text;
pub use version::{needs_legacy_parser, ZPOOL_JSON_MIN_VERSION};

use thiserror::Error;
use zfdash_core::PoolStatus;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON in zpool status output: {0}")]
    InvalidJson(String),
}

impl From<ParseError> for zfdash_core::error::DaemonError {
    fn from(err: ParseError) -> Self {
        zfdash_core::error::DaemonError::ParseFailure { message: err.to_string() }
    }
}

/// Parse `zpool status` output, dispatching to JSON or legacy-text mode.
///
/// `use_legacy` is threaded in by the caller (the result of a `zpool
/// --version` probe, cached for the process lifetime) rather than read
/// by the parser itself, so this function stays a pure transform of its
/// inputs.
pub fn parse_status(
    raw_output: &str,
    pool_name: Option<&str>,
    use_legacy: bool,
) -> Result<Vec<PoolStatus>, ParseError> {
    if use_legacy {
        Ok(text_mode::parse_status_text(raw_output, pool_name))
    } else {
        json_mode::parse_status_json(raw_output, pool_name)
    }
}
