//! CLI command handlers.

pub mod migrate;
pub mod start;
pub mod status;

use std::path::Path;

use anyhow::{Context as _, Result};

use coex_config::{CoexConfig, LoadedConfig};
use coex_store::ExecutionStore;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Merged configuration before command-line overrides.
    pub config: CoexConfig,
    /// Verbose output enabled.
    pub verbose: bool,
}

/// Load an explicit config file, or discover the layered one.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    match explicit {
        Some(path) => Ok(LoadedConfig::from_file(path)?),
        None => Ok(coex_config::load_config(None)?),
    }
}

/// Open the store at `path`, creating its directory and applying migrations.
pub fn open_store(path: &Path) -> Result<ExecutionStore> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating database directory {}", parent.display()))?;
    }
    ExecutionStore::open(path).with_context(|| format!("opening database {}", path.display()))
}
