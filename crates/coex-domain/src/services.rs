//! Wiring of the domain services.

use std::sync::Arc;

use tracing::info;

use coex_kube::BackendConnector;
use coex_session::DebugSessionRegistry;
use coex_store::ExecutionStore;

use crate::catalog::ComponentCatalog;
use crate::notifier::{Notifier, WebhookTransport};
use crate::orchestrator::{Orchestrator, OrchestratorConfig};

/// Domain services facade.
///
/// The entry point for transport layers: component CRUD through
/// [`catalog`](Self::catalog), execution lifecycle through
/// [`orchestrator`](Self::orchestrator).
#[derive(Clone)]
pub struct DomainServices {
    catalog: ComponentCatalog,
    orchestrator: Orchestrator,
}

impl DomainServices {
    pub fn new(
        store: Arc<ExecutionStore>,
        connector: Arc<dyn BackendConnector>,
        transport: Arc<dyn WebhookTransport>,
        sessions: DebugSessionRegistry,
        config: OrchestratorConfig,
    ) -> Self {
        info!("Initializing domain services");
        let notifier = Notifier::new(sessions.clone(), transport);
        let orchestrator = Orchestrator::new(
            Arc::clone(&store),
            connector,
            notifier,
            sessions,
            config,
        );
        let catalog = ComponentCatalog::new(store);
        Self {
            catalog,
            orchestrator,
        }
    }

    pub fn catalog(&self) -> &ComponentCatalog {
        &self.catalog
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }
}
