// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Response frame — :
//! `{ status: "success"|"error", data?, error?, details?, meta }`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub request_id: u64,
}

/// A daemon response, tagged by `status` exactly as describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Success {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
        meta: ResponseMeta,
    },
    Error {
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<String>,
        meta: ResponseMeta,
    },
}

impl Response {
    pub fn success(request_id: u64, data: impl Into<Option<Value>>) -> Self {
        Response::Success { data: data.into(), meta: ResponseMeta { request_id } }
    }

    pub fn error(request_id: u64, error: impl Into<String>, details: Option<String>) -> Self {
        Response::Error { error: error.into(), details, meta: ResponseMeta { request_id } }
    }

    pub fn request_id(&self) -> u64 {
        match self {
            Response::Success { meta, .. } => meta.request_id,
            Response::Error { meta, .. } => meta.request_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
