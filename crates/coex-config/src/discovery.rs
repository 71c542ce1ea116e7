//! Locating and layering config files.
//!
//! Layers, lowest precedence first:
//! 1. user: `$COEX_CONFIG_DIR/config.toml`, else `<platform config dir>/coex/config.toml`
//! 2. project: `./coex.toml`
//!
//! `--config <file>` replaces discovery with a single explicit layer. CLI
//! flags are applied on top by the binary.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::{CoexConfig, ConfigError, Result};

const PROJECT_FILE: &str = "coex.toml";
const USER_FILE: &str = "config.toml";
const CONFIG_DIR_ENV: &str = "COEX_CONFIG_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayer {
    User,
    Project,
    /// A file named on the command line.
    Explicit,
}

impl fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfigLayer::User => "user",
            ConfigLayer::Project => "project",
            ConfigLayer::Explicit => "explicit",
        })
    }
}

/// One candidate file and whether it contributed to the merged config.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub layer: ConfigLayer,
    pub path: PathBuf,
    pub loaded: bool,
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: CoexConfig,
    /// Candidates in precedence order, lowest first.
    pub sources: Vec<ConfigSource>,
    /// Layers that existed but could not be read or parsed.
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Load exactly one file. Unlike discovery, a bad file is an error.
    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self {
            config: load_config_file(path)?,
            sources: vec![ConfigSource {
                layer: ConfigLayer::Explicit,
                path: path.to_path_buf(),
                loaded: true,
            }],
            warnings: Vec::new(),
        })
    }

    pub fn loaded_from(&self) -> impl Iterator<Item = &ConfigSource> {
        self.sources.iter().filter(|s| s.loaded)
    }
}

/// Discover and merge the user and project layers.
///
/// `project_dir` defaults to the working directory.
pub fn load_config(project_dir: Option<&Path>) -> Result<LoadedConfig> {
    load_config_with_options(project_dir, None)
}

/// Like [`load_config`], reading the user layer from `config_dir` instead of
/// `COEX_CONFIG_DIR` or the platform default.
pub fn load_config_with_options(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    let user = match config_dir {
        Some(dir) => Some(dir.join(USER_FILE)),
        None => user_config_path(),
    };
    let project = project_dir.map_or_else(|| PathBuf::from(PROJECT_FILE), |d| d.join(PROJECT_FILE));

    let candidates = user
        .map(|p| (ConfigLayer::User, p))
        .into_iter()
        .chain(std::iter::once((ConfigLayer::Project, project)));

    let mut loaded = LoadedConfig {
        config: CoexConfig::new(),
        sources: Vec::new(),
        warnings: Vec::new(),
    };
    for (layer, path) in candidates {
        let mut used = false;
        if path.is_file() {
            match load_config_file(&path) {
                Ok(config) => {
                    loaded.config.merge(config);
                    used = true;
                }
                Err(e) => loaded
                    .warnings
                    .push(format!("Ignoring {layer} config {}: {e}", path.display())),
            }
        }
        loaded.sources.push(ConfigSource {
            layer,
            path,
            loaded: used,
        });
    }
    Ok(loaded)
}

pub fn load_config_file(path: &Path) -> Result<CoexConfig> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    CoexConfig::from_toml(&contents)
}

pub fn user_config_path() -> Option<PathBuf> {
    user_config_dir().map(|d| d.join(USER_FILE))
}

pub fn user_config_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::config_dir().map(|d| d.join("coex")),
    }
}
