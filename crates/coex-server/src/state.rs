//! Application state shared across handlers.

use std::sync::Arc;

use coex_domain::{ComponentCatalog, DomainServices, Orchestrator};

use crate::config::ServerConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    services: DomainServices,
    config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(services: DomainServices, config: ServerConfig) -> Self {
        Self {
            services,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ComponentCatalog {
        self.services.catalog()
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        self.services.orchestrator()
    }
}
