//! Shared harness for orchestrator integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use coex_domain::{
    DomainServices, ExecutionContext, OrchestratorConfig, RecordingWebhook, StartOutcome,
    StartRequest,
};
use coex_kube::{MockBackend, MockConnector};
use coex_session::{DebugSessionRegistry, RegistryConfig};
use coex_store::{Component, ComponentSpec, ExecutionStore};
use coex_types::{ExecutionStatus, KubeObjects, NotifyUrls};

pub const KUBE_MASTER: &str = "http://k8s.test:8080";
pub const EXECUTOR: &str = "team-a";

/// Everything an orchestrator test needs, backed by in-memory fakes.
pub struct Harness {
    pub services: DomainServices,
    pub store: Arc<ExecutionStore>,
    pub backend: Arc<MockBackend>,
    pub webhooks: Arc<RecordingWebhook>,
    pub sessions: DebugSessionRegistry,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(ExecutionStore::open_in_memory().expect("open store"));
        let backend = Arc::new(MockBackend::new());
        let webhooks = Arc::new(RecordingWebhook::new());
        let sessions = DebugSessionRegistry::new(RegistryConfig::default());
        let services = DomainServices::new(
            Arc::clone(&store),
            Arc::new(MockConnector::new(Arc::clone(&backend))),
            webhooks.clone(),
            sessions.clone(),
            OrchestratorConfig::default().with_service_url("http://coex.test"),
        );
        Self {
            services,
            store,
            backend,
            webhooks,
            sessions,
        }
    }

    /// Register a component with pod and service templates.
    pub fn component(&self, timeout: u64) -> Component {
        self.services
            .catalog()
            .create(ComponentSpec {
                name: format!("echo-{timeout}"),
                version: "v1".into(),
                image_name: "busybox".into(),
                image_tag: "1.36".into(),
                timeout,
                kube_setting: KubeObjects {
                    pod: Some(json!({"spec": {"containers": [{"command": ["echo", "hi"]}]}})),
                    service: Some(json!({"spec": {"ports": [{"port": 80}]}})),
                },
                ..Default::default()
            })
            .expect("create component")
    }

    pub fn request(&self, component: &Component) -> StartRequest {
        StartRequest {
            component_id: component.id,
            executor_name: EXECUTOR.into(),
            backend_endpoint: KUBE_MASTER.into(),
            notify_urls: notify_urls(),
            ..Default::default()
        }
    }

    /// Start `component` and wait for the background start to finish.
    pub async fn run(&self, component: &Component) -> StartOutcome {
        let outcome = self
            .services
            .orchestrator()
            .start_component(self.request(component))
            .await
            .expect("start component");
        settle().await;
        outcome
    }

    pub async fn execution(&self, id: i64) -> ExecutionContext {
        self.services
            .orchestrator()
            .get_execution(id, true)
            .await
            .expect("get execution")
            .expect("execution exists")
    }

    pub async fn status(&self, id: i64) -> ExecutionStatus {
        self.execution(id).await.status()
    }
}

pub fn notify_urls() -> NotifyUrls {
    NotifyUrls {
        status_changed: "http://hooks.test/status".into(),
        component_start: "http://hooks.test/start".into(),
        component_result: "http://hooks.test/result".into(),
        component_stop: "http://hooks.test/stop".into(),
    }
}

/// Let spawned tasks run to completion.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
