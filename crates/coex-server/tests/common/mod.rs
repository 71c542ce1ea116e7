//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use coex_domain::{DomainServices, OrchestratorConfig, RecordingWebhook};
use coex_kube::{MockBackend, MockConnector};
use coex_server::{AppState, Server, ServerConfig};
use coex_session::{DebugSessionRegistry, RegistryConfig};
use coex_store::ExecutionStore;

pub const KUBE_MASTER: &str = "http://k8s.test:8080";

/// A test server that runs in the background.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub backend: Arc<MockBackend>,
    pub webhooks: Arc<RecordingWebhook>,
    pub sessions: DebugSessionRegistry,
    _handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with_idle_timeout(Duration::from_secs(60)).await
    }

    pub async fn start_with_idle_timeout(idle_timeout: Duration) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let store = Arc::new(ExecutionStore::open_in_memory()?);
        let backend = Arc::new(MockBackend::new());
        let webhooks = Arc::new(RecordingWebhook::new());
        let sessions =
            DebugSessionRegistry::new(RegistryConfig::default().with_idle_timeout(idle_timeout));
        let services = DomainServices::new(
            store,
            Arc::new(MockConnector::new(Arc::clone(&backend))),
            webhooks.clone(),
            sessions.clone(),
            OrchestratorConfig::default().with_service_url(format!("http://{addr}")),
        );
        let config = ServerConfig::new().with_bind_address(addr);
        let server = Server::from_state(AppState::new(services, config));

        let handle = tokio::spawn(async move {
            let _ = server.serve(listener).await;
        });

        Ok(Self {
            addr,
            client: Client::builder().timeout(Duration::from_secs(10)).build()?,
            backend,
            webhooks,
            sessions,
            _handle: handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://{}{}", self.addr, path)
    }

    /// Register a component and return its id.
    pub async fn create_component(&self, name: &str, timeout: i64) -> Result<i64> {
        let response = self
            .client
            .post(self.url("/v2/components"))
            .json(&json!({
                "name": name,
                "version": "v1",
                "image_name": "busybox",
                "image_tag": "1.36",
                "timeout": timeout,
                "kube_setting": {
                    "pod": {"spec": {"containers": [{"command": ["echo", "hi"]}]}},
                    "service": {"spec": {"ports": [{"port": 80}]}}
                }
            }))
            .send()
            .await?;
        anyhow::ensure!(response.status() == 201, "create failed: {}", response.status());
        let body: Value = response.json().await?;
        body["id"]
            .as_i64()
            .ok_or_else(|| anyhow::anyhow!("missing id in {body}"))
    }

    /// Start a non-debug execution and return its id.
    pub async fn execute(&self, component_id: i64) -> Result<i64> {
        let response = self
            .client
            .post(self.url(&format!("/v2/components/{component_id}/execute")))
            .json(&json!({
                "executor": "team-a",
                "kube_master": KUBE_MASTER,
                "notify_url": {"component_result": "http://hooks.test/result"}
            }))
            .send()
            .await?;
        anyhow::ensure!(response.status() == 201, "execute failed: {}", response.status());
        let body: Value = response.json().await?;
        body["execute_seq_id"]
            .as_i64()
            .ok_or_else(|| anyhow::anyhow!("missing execute_seq_id in {body}"))
    }

    pub async fn post_event(&self, id: i64, event_type: &str, content: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/v2/events"))
            .json(&json!({"execute_seq_id": id, "type": event_type, "content": content}))
            .send()
            .await?)
    }
}

/// Let background tasks in the server run.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}
