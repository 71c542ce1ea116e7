//! Configuration system for coex.
//!
//! Provides TOML-based configuration with:
//! - Config file layering (user config dir + project-local overrides)
//! - Per-section defaults so every key is optional
//!
//! CLI flags are applied on top by the binary.

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigLayer, ConfigSource, LoadedConfig, load_config, load_config_file,
    load_config_with_options, user_config_dir, user_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
