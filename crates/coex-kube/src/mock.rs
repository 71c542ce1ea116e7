//! In-memory backend for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::backend::{BackendConnector, ObjectKind, SharedBackend, WorkloadBackend};
use crate::error::{KubeError, Result};
use crate::objects::object_name;

/// A call observed by [`MockBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Create {
        kind: ObjectKind,
        namespace: String,
        name: String,
    },
    Delete {
        kind: ObjectKind,
        namespace: String,
        name: String,
    },
    CreateNamespace(String),
}

#[derive(Default)]
struct MockState {
    calls: Vec<BackendCall>,
    objects: HashMap<(ObjectKind, String, String), Value>,
    namespaces: HashSet<String>,
    fail_create: HashSet<ObjectKind>,
    fail_delete: HashSet<ObjectKind>,
}

/// Backend that stores objects in memory and records every call.
///
/// Creation and deletion failures can be injected per object kind, and
/// creation can be delayed to widen race windows in tests.
#[derive(Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
    create_delay: Mutex<Option<Duration>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `create_object` call for `kind` fail.
    pub fn fail_create(&self, kind: ObjectKind) {
        self.state.lock().fail_create.insert(kind);
    }

    /// Make every `delete_object` call for `kind` fail.
    pub fn fail_delete(&self, kind: ObjectKind) {
        self.state.lock().fail_delete.insert(kind);
    }

    /// Sleep this long inside every `create_object` call.
    pub fn set_create_delay(&self, delay: Duration) {
        *self.create_delay.lock() = Some(delay);
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.state.lock().calls.clone()
    }

    /// Number of delete calls issued, successful or not.
    pub fn delete_count(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, BackendCall::Delete { .. }))
            .count()
    }

    pub fn create_count(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, BackendCall::Create { .. }))
            .count()
    }

    /// Objects currently stored.
    pub fn object_count(&self) -> usize {
        self.state.lock().objects.len()
    }

    pub fn has_namespace(&self, name: &str) -> bool {
        self.state.lock().namespaces.contains(name)
    }
}

#[async_trait]
impl WorkloadBackend for MockBackend {
    async fn create_object(
        &self,
        kind: ObjectKind,
        namespace: &str,
        spec: &Value,
    ) -> Result<Value> {
        let delay = *self.create_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let name = object_name(kind, 0, spec);
        let mut state = self.state.lock();
        state.calls.push(BackendCall::Create {
            kind,
            namespace: namespace.to_string(),
            name: name.clone(),
        });
        if state.fail_create.contains(&kind) {
            return Err(KubeError::Api {
                status: 500,
                message: format!("injected {kind} create failure"),
            });
        }

        let mut stored = spec.clone();
        stored["metadata"]["uid"] = json!(format!("uid-{kind}-{name}"));
        state
            .objects
            .insert((kind, namespace.to_string(), name), stored.clone());
        Ok(stored)
    }

    async fn delete_object(&self, kind: ObjectKind, namespace: &str, name: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(BackendCall::Delete {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        });
        if state.fail_delete.contains(&kind) {
            return Err(KubeError::Api {
                status: 500,
                message: format!("injected {kind} delete failure"),
            });
        }
        state
            .objects
            .remove(&(kind, namespace.to_string(), name.to_string()))
            .map(|_| ())
            .ok_or_else(|| KubeError::NotFound(format!("{kind} {namespace}/{name}")))
    }

    async fn get_namespace(&self, name: &str) -> Result<Option<Value>> {
        Ok(self
            .state
            .lock()
            .namespaces
            .contains(name)
            .then(|| json!({"metadata": {"name": name}})))
    }

    async fn create_namespace(&self, name: &str) -> Result<Value> {
        let mut state = self.state.lock();
        state.calls.push(BackendCall::CreateNamespace(name.to_string()));
        state.namespaces.insert(name.to_string());
        Ok(json!({"metadata": {"name": name}}))
    }
}

/// Connector handing out one shared [`MockBackend`] for every endpoint.
#[derive(Default, Clone)]
pub struct MockConnector {
    backend: Arc<MockBackend>,
    endpoints: Arc<Mutex<Vec<String>>>,
}

impl MockConnector {
    pub fn new(backend: Arc<MockBackend>) -> Self {
        Self {
            backend,
            endpoints: Arc::default(),
        }
    }

    pub fn backend(&self) -> &Arc<MockBackend> {
        &self.backend
    }

    /// Endpoints passed to `connect`, in call order.
    pub fn endpoints(&self) -> Vec<String> {
        self.endpoints.lock().clone()
    }
}

impl BackendConnector for MockConnector {
    fn connect(&self, endpoint: &str) -> Result<SharedBackend> {
        self.endpoints.lock().push(endpoint.to_string());
        let backend: SharedBackend = self.backend.clone();
        Ok(backend)
    }
}
