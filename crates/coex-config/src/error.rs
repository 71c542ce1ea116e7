use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A key parsed but holds a value the service cannot run with.
    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: String, reason: String },
}
