// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The control center: the persisted registry of remote agent
//! connections, plus which one (if any) is currently active.
//!
//! `add_connection`/`remove_connection`/`connect_to_agent`/
//! `switch_active`/`is_healthy_or_clear`/`list_connections` own all of
//! this state directly — no callee may silently substitute the local
//! daemon for a dead remote, so the active-alias bookkeeping lives on
//! this type itself rather than behind a caller-supplied session.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};

use zfdash_core::agent_record::RemoteAgentRecord;

use crate::runtime::ClientRuntime;
use crate::{agent_store, transport, trust_store};
use crate::ClientError;

/// Reserved alias meaning "use the local privileged daemon", never a valid
/// persisted remote alias.
pub const LOCAL_ALIAS: &str = "local";

/// A live, authenticated connection to a remote agent, cached under its
/// alias once [`ControlCenterManager::connect_to_agent`] succeeds.
struct ConnectedAgent {
    runtime: Arc<ClientRuntime>,
}

/// Owns the local daemon runtime, the persisted remote-agent registry, and
/// the set of currently live remote connections plus which one (if any) is
/// active.
pub struct ControlCenterManager {
    config_dir: PathBuf,
    local: Arc<ClientRuntime>,
    agents: AsyncMutex<HashMap<String, ConnectedAgent>>,
    active_alias: AsyncMutex<Option<String>>,
}

impl ControlCenterManager {
    pub fn new(config_dir: PathBuf, local: Arc<ClientRuntime>) -> Self {
        Self { config_dir, local, agents: AsyncMutex::new(HashMap::new()), active_alias: AsyncMutex::new(None) }
    }

    /// Register a new remote agent identity. Refuses a duplicate alias
    /// without touching the registry.
    pub async fn add_connection(&self, alias: &str, host: &str, port: u16, use_tls: bool) -> Result<(), ClientError> {
        let existing = agent_store::load(&self.config_dir)?;
        if existing.iter().any(|r| r.alias == alias) {
            return Err(ClientError::CommunicationError(format!("alias '{alias}' is already registered")));
        }
        agent_store::upsert(&self.config_dir, RemoteAgentRecord::new(alias, host, port, use_tls))
    }

    /// Close any live connection, clear its pinned certificate, and remove
    /// the persisted entry.
    pub async fn remove_connection(&self, alias: &str) -> Result<(), ClientError> {
        let records = agent_store::load(&self.config_dir)?;
        let record = records.into_iter().find(|r| r.alias == alias);

        if let Some(agent) = self.agents.lock().await.remove(alias) {
            agent.runtime.close().await?;
        }

        let mut active = self.active_alias.lock().await;
        if active.as_deref() == Some(alias) {
            *active = None;
        }
        drop(active);

        if let Some(record) = record {
            let _ = trust_store::remove(&self.config_dir, &record.host, record.port);
        }

        agent_store::remove(&self.config_dir, alias)?;
        Ok(())
    }

    /// Open a TLS-TCP client runtime to `alias` using its saved `use_tls`
    /// setting, authenticate with `password`, and cache the runtime under
    /// the record so later calls reuse it.
    pub async fn connect_to_agent(&self, alias: &str, password: &str) -> Result<(), ClientError> {
        let records = agent_store::load(&self.config_dir)?;
        let record = records
            .into_iter()
            .find(|r| r.alias == alias)
            .ok_or_else(|| ClientError::CommunicationError(format!("unknown alias '{alias}'")))?;

        let conn = transport::tls::connect(&record.host, record.port, record.use_tls, password, &self.config_dir).await?;
        let runtime = Arc::new(ClientRuntime::spawn(conn));

        self.agents.lock().await.insert(alias.to_string(), ConnectedAgent { runtime });
        info!(alias, host = %record.host, port = record.port, "connected to remote agent");
        Ok(())
    }

    /// Set the active alias. `"local"` clears it, selecting the local
    /// daemon. Any other value must already be a live, connected agent.
    pub async fn switch_active(&self, alias: &str) -> Result<(), ClientError> {
        if alias == LOCAL_ALIAS {
            *self.active_alias.lock().await = None;
            return Ok(());
        }

        if !self.agents.lock().await.contains_key(alias) {
            return Err(ClientError::CommunicationError(format!(
                "cannot switch to '{alias}': not connected (call connect_to_agent first)"
            )));
        }

        *self.active_alias.lock().await = Some(alias.to_string());
        Ok(())
    }

    /// The sole source of truth for the active agent's health. If the
    /// active alias's runtime has died, clears it and returns
    /// `(false, None)` — callers must never substitute the local daemon
    /// for a dead remote themselves.
    pub async fn is_healthy_or_clear(&self) -> (bool, Option<String>) {
        let alias = self.active_alias.lock().await.clone();
        let Some(alias) = alias else {
            return (true, None);
        };

        let healthy = self.agents.lock().await.get(&alias).map(|a| a.runtime.is_healthy()).unwrap_or(false);
        if healthy {
            (true, Some(alias))
        } else {
            warn!(alias, "active remote agent is unhealthy, clearing active selection");
            self.agents.lock().await.remove(&alias);
            *self.active_alias.lock().await = None;
            (false, None)
        }
    }

    /// Every registered remote agent, with `state.connected`/`tls_active`
    /// refreshed against the live connection set.
    pub async fn list_connections(&self) -> Result<Vec<RemoteAgentRecord>, ClientError> {
        let mut records = agent_store::load(&self.config_dir)?;
        let agents = self.agents.lock().await;
        for record in &mut records {
            if let Some(agent) = agents.get(&record.alias) {
                record.state.0.connected = agent.runtime.is_healthy();
                record.state.0.tls_active = agent.runtime.tls_active();
            }
        }
        Ok(records)
    }

    /// The runtime a caller should issue the next command against.
    ///
    /// Returns the local daemon's runtime when no remote is active. When a
    /// remote is active but unhealthy, returns `None` — the caller must
    /// surface [`ClientError::RemoteAgentDisconnected`] rather than
    /// silently falling back to the local daemon.
    pub async fn get_active_client(&self) -> Option<Arc<ClientRuntime>> {
        let (healthy, alias) = self.is_healthy_or_clear().await;
        if !healthy {
            return None;
        }
        match alias {
            None => Some(Arc::clone(&self.local)),
            Some(alias) => self.agents.lock().await.get(&alias).map(|a| Arc::clone(&a.runtime)),
        }
    }
}

#[cfg(test)]
#[path = "control_center_tests.rs"]
mod tests;
