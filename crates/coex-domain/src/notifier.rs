//! Lifecycle notification delivery.
//!
//! Debug executions are notified through their registry session; all
//! others get a fire-and-forget webhook POST. Failures are logged and
//! never retried.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Client;
use tracing::{debug, warn};

use coex_session::DebugSessionRegistry;
use coex_types::{EventMsg, ExecuteComponentMsg};

use crate::context::ExecutionContext;
use crate::error::{DomainError, Result};

/// Default timeout for a single webhook POST.
const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 10;

/// Outbound delivery of a payload to a webhook URL.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn deliver(&self, url: &str, payload: &ExecuteComponentMsg) -> Result<()>;
}

/// Webhook transport over HTTP.
#[derive(Debug, Clone)]
pub struct HttpWebhook {
    client: Client,
}

impl HttpWebhook {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_WEBHOOK_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookTransport for HttpWebhook {
    async fn deliver(&self, url: &str, payload: &ExecuteComponentMsg) -> Result<()> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| DomainError::Notify(e.to_string()))?;
        if !response.status().is_success() {
            return Err(DomainError::Notify(format!(
                "{url} answered {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Transport that records deliveries instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingWebhook {
    deliveries: Mutex<Vec<(String, ExecuteComponentMsg)>>,
}

impl RecordingWebhook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(url, payload)` delivered so far, in order.
    pub fn deliveries(&self) -> Vec<(String, ExecuteComponentMsg)> {
        self.deliveries.lock().clone()
    }

    pub fn delivered_to(&self, url: &str) -> Vec<ExecuteComponentMsg> {
        self.deliveries
            .lock()
            .iter()
            .filter(|(u, _)| u == url)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

#[async_trait]
impl WebhookTransport for RecordingWebhook {
    async fn deliver(&self, url: &str, payload: &ExecuteComponentMsg) -> Result<()> {
        self.deliveries
            .lock()
            .push((url.to_string(), payload.clone()));
        Ok(())
    }
}

/// Which notification is being sent.
#[derive(Debug, Clone, Copy)]
enum Kind<'a> {
    StatusChanged,
    Event(&'a EventMsg),
}

/// Routes execution notifications to debug sessions or webhooks.
#[derive(Clone)]
pub struct Notifier {
    sessions: DebugSessionRegistry,
    transport: Arc<dyn WebhookTransport>,
}

impl Notifier {
    pub fn new(sessions: DebugSessionRegistry, transport: Arc<dyn WebhookTransport>) -> Self {
        Self {
            sessions,
            transport,
        }
    }

    /// Notify a status change driven by start, stop, teardown or timeout.
    pub async fn status_changed(&self, ctx: &ExecutionContext) {
        self.dispatch(ctx, Kind::StatusChanged).await;
    }

    /// Notify the arrival of `event`.
    pub async fn event_received(&self, ctx: &ExecutionContext, event: &EventMsg) {
        self.dispatch(ctx, Kind::Event(event)).await;
    }

    async fn dispatch(&self, ctx: &ExecutionContext, kind: Kind<'_>) {
        let id = ctx.id();
        if ctx.is_debug() {
            let payload = match kind {
                Kind::StatusChanged => ctx.message_with(Vec::new()),
                Kind::Event(event) => ctx.message_with(vec![event.clone()]),
            };
            if let Err(e) = self.sessions.send(id, payload).await {
                debug!(execution_id = id, error = %e, "Debug notification dropped");
            }
            return;
        }

        let urls = ctx.notify_urls();
        let (label, url, payload) = match kind {
            Kind::StatusChanged => ("status_changed", urls.status_changed.as_str(), ctx.message()),
            Kind::Event(event) => (
                event.event_type.as_str(),
                urls.for_event(event.event_type),
                ctx.message_with(vec![event.clone()]),
            ),
        };
        if url.is_empty() {
            warn!(execution_id = id, kind = label, "No notify url registered, skipping");
            return;
        }

        let url = url.to_string();
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            match transport.deliver(&url, &payload).await {
                Ok(()) => debug!(execution_id = id, kind = label, url = %url, "Notification delivered"),
                Err(e) => warn!(execution_id = id, kind = label, url = %url, error = %e, "Notification failed"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_payload() -> ExecuteComponentMsg {
        serde_json::from_value(serde_json::json!({
            "execute_seq_id": 3,
            "component_id": 1,
            "status": "finished",
            "type": "Kubernetes",
            "image_name": "busybox",
            "image_tag": "1.36",
            "timeout": 0,
            "kube_master": "http://k8s",
            "kube_setting": {},
            "input": null,
            "envs": [],
            "notify_url": {},
            "kube_resp": {},
            "detail": ""
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_http_webhook_posts_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hooks/result"))
            .and(body_partial_json(serde_json::json!({"execute_seq_id": 3, "status": "finished"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let webhook = HttpWebhook::new().unwrap();
        webhook
            .deliver(&format!("{}/hooks/result", server.uri()), &sample_payload())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_http_webhook_non_success_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let webhook = HttpWebhook::new().unwrap();
        let err = webhook
            .deliver(&server.uri(), &sample_payload())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Notify(_)));
    }
}
