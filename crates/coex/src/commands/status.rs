//! Status command - checks whether a server answers its health endpoint.

use std::time::Duration;

use anyhow::{Result, bail};
use clap::Args;
use serde::Deserialize;

use super::Context;

/// Arguments for the status command.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Server URL (default: derived from config)
    #[arg(long, env = "COEX_SERVER_URL")]
    pub server: Option<String>,

    /// Output as JSON (for scripting)
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Deserialize)]
struct Health {
    version: String,
    debug_sessions: DebugSessions,
}

#[derive(Debug, Deserialize)]
struct DebugSessions {
    live: usize,
    capacity: usize,
}

pub async fn run(args: StatusArgs, ctx: &Context) -> Result<()> {
    let server_url = args
        .server
        .unwrap_or_else(|| ctx.config.server().service_url());
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    let health = match client
        .get(format!("{}/health", server_url.trim_end_matches('/')))
        .send()
        .await
    {
        Ok(response) if response.status().is_success() => Some(response.json::<Health>().await?),
        Ok(response) => {
            tracing::debug!(status = %response.status(), "Health check failed");
            None
        }
        Err(e) => {
            tracing::debug!(error = %e, "Health check failed");
            None
        }
    };

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "running": health.is_some(),
                "version": health.as_ref().map(|h| h.version.clone()),
                "debug_sessions": health.as_ref().map(|h| h.debug_sessions.live),
                "server_url": server_url,
            })
        );
    } else if let Some(health) = &health {
        println!("coex {} running at {}", health.version, server_url);
        println!(
            "  debug sessions: {}/{}",
            health.debug_sessions.live, health.debug_sessions.capacity
        );
    } else {
        println!("coex is not running at {}", server_url);
    }

    if health.is_none() && !args.json {
        bail!("server unreachable");
    }
    Ok(())
}
