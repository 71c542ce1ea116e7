//! Workload backend for coex.
//!
//! [`WorkloadBackend`] is the narrow interface the orchestrator uses to
//! create and delete pods and services. [`KubeClient`] implements it over
//! the Kubernetes core/v1 REST API; [`MockBackend`] is an in-memory
//! implementation for tests.

pub mod backend;
pub mod client;
pub mod error;
pub mod mock;
pub mod objects;

pub use backend::{BackendConnector, ObjectKind, SharedBackend, WorkloadBackend};
pub use client::{KubeClient, KubeConfig, KubeConnector};
pub use error::{KubeError, Result};
pub use mock::{BackendCall, MockBackend, MockConnector};
pub use objects::{WorkloadSpec, object_name, pod_name, service_name};
