// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request frame — : `{ command, args, kwargs, meta }`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-request metadata echoed unchanged in the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestMeta {
    pub request_id: u64,
    #[serde(default)]
    pub log_enabled: bool,
    #[serde(default = "default_user_uid")]
    pub user_uid: i32,
}

fn default_user_uid() -> i32 {
    -1
}

impl RequestMeta {
    pub fn new(request_id: u64) -> Self {
        Self { request_id, log_enabled: false, user_uid: -1 }
    }
}

/// One request frame, as carried over the wire.
///
/// The wire shape stays string-keyed (`command` + free-form
/// `args`/`kwargs`) so any client can construct a request without knowing
/// this implementation's internal types; `zfdash-registry::Command`
/// deserializes the typed, tagged variant from this envelope at the edge
///.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub command: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: Map<String, Value>,
    pub meta: RequestMeta,
}

impl Request {
    pub fn new(command: impl Into<String>, request_id: u64) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            kwargs: Map::new(),
            meta: RequestMeta::new(request_id),
        }
    }

    pub fn with_kwargs(mut self, kwargs: Map<String, Value>) -> Self {
        self.kwargs = kwargs;
        self
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
