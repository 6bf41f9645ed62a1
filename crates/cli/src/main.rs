// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Process entry point for the ZfDash daemon and its launcher/probe
//! helpers (CLI surface table, the only public command-line
//! contract). One binary plays both roles: spawned with `--daemon` it
//! runs the dispatcher; otherwise the flags select one of the
//! launcher/connectivity helpers a caller embedding `zfdash-client` would
//! otherwise have to drive by hand.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use zfdash_client::launcher::{DaemonLauncher, EscalatedLauncher, LaunchTransport};
use zfdash_client::transport::uds as client_uds;
use zfdash_client::ClientRuntime;
use zfdash_daemon::{DaemonConfig, TransportMode};
use zfdash_wire::Response;

/// ZfDash storage management daemon and launcher.
#[derive(Parser, Debug)]
#[command(name = "zfdash", version, about = "ZfDash storage management daemon and launcher")]
struct Cli {
    /// Run as daemon (requires --uid and --gid).
    #[arg(long)]
    daemon: bool,

    /// Target user the daemon operates for.
    #[arg(long)]
    uid: Option<i32>,

    /// Target group the daemon operates for.
    #[arg(long)]
    gid: Option<i32>,

    /// Daemon listens on a UDS (default: canonical per-UID path).
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "")]
    listen_socket: Option<String>,

    /// Daemon listens on TCP (agent mode).
    #[arg(long)]
    agent: bool,

    /// TCP port for agent mode; implies `--agent`.
    #[arg(long, value_name = "N")]
    agent_port: Option<u16>,

    /// Disable TLS in agent mode (otherwise TLS is mandatory).
    #[arg(long)]
    no_tls: bool,

    /// Client uses UDS mode; launch a persistent daemon if none is running.
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "")]
    socket: Option<String>,

    /// Client uses UDS mode; do not launch a daemon.
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "")]
    connect_socket: Option<String>,

    /// Launch a persistent daemon and exit.
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "")]
    launch_daemon: Option<String>,

    /// Send `shutdown_daemon` to a running UDS daemon and exit.
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "")]
    stop_daemon: Option<String>,

    /// Enable verbose diagnostic output.
    #[arg(long)]
    debug: bool,
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

/// Resolve a `[PATH]`-style flag's value: the canonical per-UID default
/// if given bare (empty string, from `default_missing_value`), or the
/// explicit path otherwise.
fn resolve_path_value(raw: &str, uid: i32) -> PathBuf {
    if raw.is_empty() { client_uds::canonical_socket_path(uid) } else { PathBuf::from(raw) }
}

/// Resolve a `[PATH]`-style flag: `None` if the flag was absent, the
/// resolved path otherwise.
fn resolve_path_flag(raw: &Option<String>, uid: i32) -> Option<PathBuf> {
    raw.as_deref().map(|s| resolve_path_value(s, uid))
}

fn current_uid_gid() -> (i32, i32) {
    #[cfg(unix)]
    {
        (nix::unistd::getuid().as_raw() as i32, nix::unistd::getgid().as_raw() as i32)
    }
    #[cfg(not(unix))]
    {
        (-1, -1)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("zfdash: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.daemon {
        return run_daemon(cli).await;
    }

    let (default_uid, default_gid) = current_uid_gid();
    let uid = cli.uid.unwrap_or(default_uid);
    let gid = cli.gid.unwrap_or(default_gid);

    if let Some(raw) = &cli.stop_daemon {
        let path = resolve_path_value(raw, uid);
        zfdash_daemon::dispatch::send_stop_request(&path).await?;
        println!("sent shutdown_daemon to {}", path.display());
        return Ok(());
    }

    if let Some(raw) = &cli.launch_daemon {
        let path = resolve_path_value(raw, uid);
        launch_persistent_daemon(uid, gid, path.clone()).await?;
        println!("daemon listening on {}", path.display());
        return Ok(());
    }

    if let Some(raw) = &cli.socket {
        let path = resolve_path_value(raw, uid);
        let runtime = match client_uds::connect(&path).await {
            Ok(conn) => std::sync::Arc::new(ClientRuntime::spawn(conn)),
            Err(_) => {
                info!(path = %path.display(), "no daemon listening, launching one");
                launch_persistent_daemon(uid, gid, path.clone()).await?
            }
        };
        probe(&runtime).await?;
        return Ok(());
    }

    if let Some(raw) = &cli.connect_socket {
        let path = resolve_path_value(raw, uid);
        let conn = client_uds::connect(&path).await?;
        let runtime = std::sync::Arc::new(ClientRuntime::spawn(conn));
        probe(&runtime).await?;
        return Ok(());
    }

    anyhow::bail!(
        "no action requested; pass --daemon, --socket, --connect-socket, --launch-daemon, or --stop-daemon"
    )
}

async fn run_daemon(cli: Cli) -> anyhow::Result<()> {
    let uid = cli.uid.ok_or_else(|| anyhow::anyhow!("--daemon requires --uid"))?;
    let gid = cli.gid.ok_or_else(|| anyhow::anyhow!("--daemon requires --gid"))?;

    let transport = if cli.agent || cli.agent_port.is_some() {
        let port = cli.agent_port.ok_or_else(|| anyhow::anyhow!("--agent requires --agent-port"))?;
        TransportMode::Agent { port, use_tls: !cli.no_tls }
    } else if let Some(path) = resolve_path_flag(&cli.listen_socket, uid) {
        TransportMode::Uds { path: Some(path) }
    } else {
        TransportMode::Pipe
    };

    info!(uid, gid, "starting zfdash daemon");
    let config = DaemonConfig { transport, uid, gid, debug: cli.debug };
    zfdash_daemon::run(config).await?;
    Ok(())
}

/// Find a privilege escalator, spawn `--daemon --uid --gid --listen-socket
/// <path>` through it, and wait for readiness.
async fn launch_persistent_daemon(uid: i32, gid: i32, path: PathBuf) -> anyhow::Result<std::sync::Arc<ClientRuntime>> {
    let daemon_path = std::env::current_exe()?;
    let launcher = EscalatedLauncher::new();
    let conn = launcher.launch(&daemon_path, uid, gid, LaunchTransport::Uds { path: Some(path) }).await?;
    Ok(std::sync::Arc::new(ClientRuntime::spawn(conn)))
}

/// Issue one `get_pool_status` request as a connectivity smoke test and
/// print the raw response, mirroring what a caller driving this protocol
/// by hand would do first.
async fn probe(runtime: &ClientRuntime) -> anyhow::Result<()> {
    let response = runtime.request("get_pool_status", serde_json::Map::new()).await?;
    match response {
        Response::Success { data, .. } => {
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Response::Error { error, details, .. } => {
            anyhow::bail!("{error}{}", details.map(|d| format!(": {d}")).unwrap_or_default());
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
