//! coex - Component Execution Orchestrator
//!
//! Main entry point for the coex CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use coex_config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;

use commands::{migrate, start, status};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// coex - runs registered container components on Kubernetes on demand
#[derive(Parser)]
#[command(name = "coex")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file (overrides default discovery)
    #[arg(long, global = true, env = "COEX_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the coex server
    Start(start::StartArgs),

    /// Apply database migrations and exit
    Migrate(migrate::MigrateArgs),

    /// Check whether a server is running
    Status(status::StatusArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = commands::load_config(cli.config.as_deref())?;
    for warning in &loaded.warnings {
        eprintln!("warning: {}", warning);
    }
    let sources: Vec<_> = loaded
        .loaded_from()
        .map(|s| format!("{} ({})", s.path.display(), s.layer))
        .collect();
    let config = loaded.config;

    let _log_guard = init_tracing(&config.logging(), cli.verbose);

    if !sources.is_empty() {
        tracing::debug!(sources = ?sources, "Loaded configuration");
    }

    let ctx = commands::Context {
        config,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Start(args) => start::run(args, &ctx).await,
        Commands::Migrate(args) => migrate::run(args, &ctx),
        Commands::Status(args) => status::run(args, &ctx).await,
    }
}

/// Our own tracing targets; other crates fall back to a quieter level.
const LOG_TARGETS: &[&str] = &[
    "coex",
    "coex_server",
    "coex_domain",
    "coex_kube",
    "coex_store",
    "coex_session",
];

fn directives(level: &str, fallback: &str) -> String {
    let mut parts: Vec<String> = LOG_TARGETS.iter().map(|t| format!("{t}={level}")).collect();
    parts.push(fallback.to_string());
    parts.join(",")
}

/// Console output filtered by `--verbose` or `[logging] level`, plus a daily
/// rolling JSON file with everything down to `trace`.
fn init_tracing(logging: &LoggingConfig, verbose: bool) -> WorkerGuard {
    let console_filter = if verbose {
        directives("debug", "info")
    } else if let Some(level) = &logging.level {
        level.clone()
    } else {
        directives("info", "warn")
    };

    let file_appender = tracing_appender::rolling::daily(logging.resolved_directory(), "coex.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_filter(EnvFilter::new(console_filter)),
        )
        .with(
            fmt::layer()
                .json()
                .with_writer(file_writer)
                .with_filter(EnvFilter::new(directives("trace", "info"))),
        )
        .init();
    guard
}
