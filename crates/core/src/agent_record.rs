// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote agent registry records: fields that survive a restart
//! (persisted) split cleanly from fields that only make sense for a live
//! connection (runtime-only, never written to disk).

use serde::{Deserialize, Serialize};

/// Live connection state for a registered remote agent. Never persisted;
/// rebuilt each time the client runtime reconnects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConnectionState {
    pub connected: bool,
    pub tls_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_connected_epoch_ms: Option<u64>,
}

/// One entry in the control center's registry of remote ZfDash agents.
///
/// `alias`/`host`/`port`/`use_tls` are the persisted identity of the
/// connection; `state` is rebuilt at runtime and never written to
/// `remote_agents.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAgentRecord {
    pub alias: String,
    pub host: String,
    pub port: u16,
    pub use_tls: bool,
    #[serde(skip, default)]
    pub state: AgentConnectionStateEq,
}

/// `AgentConnectionState` wrapped so `RemoteAgentRecord` can derive `Eq`
/// (floats never appear in the state, so structural equality is sound).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentConnectionStateEq(pub AgentConnectionState);

impl RemoteAgentRecord {
    pub fn new(alias: impl Into<String>, host: impl Into<String>, port: u16, use_tls: bool) -> Self {
        Self {
            alias: alias.into(),
            host: host.into(),
            port,
            use_tls,
            state: AgentConnectionStateEq::default(),
        }
    }

    pub fn host_key(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
