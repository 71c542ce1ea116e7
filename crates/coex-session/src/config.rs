//! Configuration for the debug session registry.

use std::time::Duration;

/// Default maximum number of live debug sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 50;

/// Default number of undelivered messages buffered per session.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;

/// Default inactivity window after which a debug connection is closed.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Configuration for the debug session registry.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Maximum number of sessions before LRU eviction.
    pub max_sessions: usize,

    /// Messages buffered per session before the consumer counts as stalled.
    pub channel_capacity: usize,

    /// Debug connections idle for this long are closed by the request layer.
    pub idle_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }
}
