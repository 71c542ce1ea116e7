//! Listener settings for the HTTP server.

use std::net::SocketAddr;

/// Request bodies are component templates and event payloads; 2 MiB is ample.
pub const DEFAULT_MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: SocketAddr,
    /// Wrap the router in `TraceLayer`.
    pub request_logging: bool,
    /// Upper bound on JSON request bodies, in bytes.
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 7300)),
            request_logging: true,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.request_logging = enabled;
        self
    }

    pub fn with_max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }
}
