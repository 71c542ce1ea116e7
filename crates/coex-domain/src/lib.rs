//! Domain layer for coex.
//!
//! Sits between the request layer and the infrastructure crates:
//!
//! - **Catalog**: component template CRUD and versioning
//! - **Orchestrator**: the execution state machine, timeout watchdog and
//!   compensating teardown
//! - **Notifier**: webhook and debug-session delivery of lifecycle changes
//!
//! # Example
//!
//! ```ignore
//! use coex_domain::{DomainServices, StartRequest};
//!
//! let services = DomainServices::new(store, connector, transport, sessions, config);
//! let outcome = services.orchestrator().start_component(StartRequest {
//!     component_id: 1,
//!     executor_name: "team-a".into(),
//!     backend_endpoint: "https://k8s.internal:6443".into(),
//!     ..Default::default()
//! }).await?;
//! ```

pub mod catalog;
pub mod context;
mod error;
pub mod notifier;
pub mod orchestrator;
mod services;
pub mod state;

pub use catalog::ComponentCatalog;
pub use context::ExecutionContext;
pub use error::{DomainError, Result};
pub use notifier::{HttpWebhook, Notifier, RecordingWebhook, WebhookTransport};
pub use orchestrator::{
    DEBUG_EXECUTOR, EVENTS_PATH, Orchestrator, OrchestratorConfig, StartOutcome, StartRequest,
};
pub use services::DomainServices;
