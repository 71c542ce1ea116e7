//! Migrate command - applies the embedded schema migrations.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::{Context, open_store};

/// Arguments for the migrate command.
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// SQLite database path (overrides config)
    #[arg(long, env = "COEX_DATABASE")]
    pub database: Option<PathBuf>,
}

pub fn run(args: MigrateArgs, ctx: &Context) -> Result<()> {
    let path = args
        .database
        .unwrap_or_else(|| ctx.config.database().resolved_path());
    open_store(&path)?;
    println!("Database up to date: {}", path.display());
    Ok(())
}
