//! Start command - launches the coex server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::info;

use coex_domain::{DomainServices, HttpWebhook, OrchestratorConfig};
use coex_kube::{KubeConfig, KubeConnector};
use coex_server::{AppState, Server, ServerConfig};
use coex_session::{DebugSessionRegistry, RegistryConfig};

use super::{Context, open_store};

/// Arguments for the start command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Base URL workloads use to reach this server (overrides config)
    #[arg(long, env = "COEX_PUBLIC_URL")]
    pub public_url: Option<String>,

    /// SQLite database path (overrides config)
    #[arg(long, env = "COEX_DATABASE")]
    pub database: Option<PathBuf>,

    /// Bearer token for the Kubernetes API (overrides config)
    #[arg(long, env = "COEX_KUBE_TOKEN")]
    pub kube_token: Option<String>,
}

/// Run the start command.
pub async fn run(args: StartArgs, ctx: &Context) -> Result<()> {
    // ── Resolve configuration ───────────────────────────────────────────

    let mut config = ctx.config.clone();
    let mut server_cfg = config.server();
    if let Some(port) = args.port {
        server_cfg.port = port;
    }
    if let Some(bind) = args.bind {
        server_cfg.bind = bind;
    }
    if let Some(url) = args.public_url {
        server_cfg.public_url = Some(url);
    }
    let mut kube_cfg = config.kubernetes();
    if let Some(token) = args.kube_token {
        kube_cfg.token = Some(token);
    }
    config.server = Some(server_cfg.clone());
    config.kubernetes = Some(kube_cfg.clone());
    config.validate()?;

    let addr: SocketAddr = format!("{}:{}", server_cfg.bind, server_cfg.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", server_cfg.bind, server_cfg.port))?;
    let service_url = server_cfg.service_url();

    // ── Infrastructure ──────────────────────────────────────────────────

    let db_path = args
        .database
        .unwrap_or_else(|| config.database().resolved_path());
    let store = Arc::new(open_store(&db_path)?);

    let mut kube = KubeConfig::default()
        .with_timeout(Duration::from_secs(kube_cfg.request_timeout_secs));
    if let Some(token) = kube_cfg.token {
        kube = kube.with_token(token);
    }
    let connector = Arc::new(KubeConnector::new(kube)?);

    let debug_cfg = config.debug();
    let sessions = DebugSessionRegistry::new(
        RegistryConfig::new()
            .with_max_sessions(debug_cfg.max_sessions)
            .with_channel_capacity(debug_cfg.channel_capacity)
            .with_idle_timeout(Duration::from_secs(debug_cfg.idle_timeout_secs)),
    )
    .with_eviction_callback(|execution_id, reason| {
        tracing::debug!(execution_id, ?reason, "Debug session evicted");
    });

    let services = DomainServices::new(
        store,
        connector,
        Arc::new(HttpWebhook::new()?),
        sessions,
        OrchestratorConfig::default().with_service_url(service_url.clone()),
    );

    // ── Start server ────────────────────────────────────────────────────

    let server_config = ServerConfig::new()
        .with_bind_address(addr)
        .with_request_logging(server_cfg.request_logging);
    let server = Server::from_state(AppState::new(services, server_config));

    info!(database = %db_path.display(), service_url = %service_url, "coex starting");
    if ctx.verbose {
        println!("Database: {}", db_path.display());
        println!("Workload callback URL: {}", service_url);
    }
    println!("coex server starting on http://{}", addr);

    server.run().await?;
    Ok(())
}
