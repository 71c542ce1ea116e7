//! Payload types shared by webhooks, the debug channel and the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ComponentKind, EventType, ExecutionStatus};

/// A single environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Env {
    pub key: String,
    pub value: String,
}

impl Env {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Webhook endpoints registered for one execution. Empty means unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyUrls {
    pub status_changed: String,
    pub component_start: String,
    pub component_result: String,
    pub component_stop: String,
}

impl NotifyUrls {
    /// URL for notifications about a received event.
    pub fn for_event(&self, event: EventType) -> &str {
        match event {
            EventType::ComponentStart => &self.component_start,
            EventType::ComponentResult => &self.component_result,
            EventType::ComponentStop => &self.component_stop,
        }
    }

    /// All configured URLs paired with their field name.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("status_changed", self.status_changed.as_str()),
            ("component_start", self.component_start.as_str()),
            ("component_result", self.component_result.as_str()),
            ("component_stop", self.component_stop.as_str()),
        ]
        .into_iter()
        .filter(|(_, url)| !url.is_empty())
    }
}

/// A pod and/or service object.
///
/// Used both for the template a component carries (`kube_setting`) and for
/// what the backend returned (`kube_resp`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KubeObjects {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<Value>,
}

impl KubeObjects {
    pub fn is_empty(&self) -> bool {
        self.pod.is_none() && self.service.is_none()
    }
}

/// A lifecycle event as delivered to consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMsg {
    pub execute_seq_id: i64,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub content: String,
    pub create_at: DateTime<Utc>,
}

/// Full execution context sent to webhooks and debug sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteComponentMsg {
    pub execute_seq_id: i64,
    pub component_id: i64,
    pub status: ExecutionStatus,
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    pub image_name: String,
    pub image_tag: String,
    pub timeout: u64,
    pub kube_master: String,
    pub kube_setting: KubeObjects,
    pub input: Value,
    pub envs: Vec<Env>,
    pub notify_url: NotifyUrls,
    pub kube_resp: KubeObjects,
    pub detail: String,
    #[serde(default)]
    pub events: Vec<EventMsg>,
}
