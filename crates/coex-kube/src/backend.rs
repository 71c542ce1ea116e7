//! Backend trait and object kinds.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Kind of object the orchestrator manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Pod,
    Service,
}

impl ObjectKind {
    /// Collection segment in the core/v1 REST path.
    pub fn resource(&self) -> &'static str {
        match self {
            ObjectKind::Pod => "pods",
            ObjectKind::Service => "services",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Pod => f.write_str("pod"),
            ObjectKind::Service => f.write_str("service"),
        }
    }
}

/// A Kubernetes-compatible API able to create and delete workload objects.
#[async_trait]
pub trait WorkloadBackend: Send + Sync {
    /// Create an object and return it as stored by the backend.
    async fn create_object(&self, kind: ObjectKind, namespace: &str, spec: &Value)
    -> Result<Value>;

    /// Delete an object by name. Returns `KubeError::NotFound` if absent.
    async fn delete_object(&self, kind: ObjectKind, namespace: &str, name: &str) -> Result<()>;

    /// Look up a namespace; `None` if it does not exist.
    async fn get_namespace(&self, name: &str) -> Result<Option<Value>>;

    /// Create a namespace. Succeeds if it already exists.
    async fn create_namespace(&self, name: &str) -> Result<Value>;

    /// Ensure `name` exists, creating it when missing.
    async fn ensure_namespace(&self, name: &str) -> Result<()> {
        if self.get_namespace(name).await?.is_none() {
            tracing::info!(namespace = %name, "Creating namespace");
            self.create_namespace(name).await?;
        }
        Ok(())
    }
}

/// Shared handle to a backend.
pub type SharedBackend = Arc<dyn WorkloadBackend>;

/// Produces a backend for the endpoint recorded on an execution.
pub trait BackendConnector: Send + Sync {
    fn connect(&self, endpoint: &str) -> Result<SharedBackend>;
}
