use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use coex_types::{
    ComponentKind, DETAIL_TIME_FORMAT, Env, EventType, ExecutionStatus, KubeObjects, NotifyUrls,
};

/// Editable fields of a component template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentSpec {
    pub name: String,
    pub version: String,
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    pub image_name: String,
    pub image_tag: String,
    pub kube_setting: KubeObjects,
    /// Seconds; zero disables the watchdog.
    pub timeout: u64,
    pub envs: Vec<Env>,
    pub input: Value,
    pub output: Value,
}

/// A registered, versioned component template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: i64,
    #[serde(flatten)]
    pub spec: ComponentSpec,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query over the component catalog.
#[derive(Debug, Clone, Default)]
pub struct ComponentFilter {
    pub name: Option<String>,
    pub version: Option<String>,
    /// Match `name` as a substring instead of exactly.
    pub fuzzy: bool,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// A tenant; one executor maps to one Kubernetes namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Executor {
    pub id: i64,
    pub name: String,
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to insert a fresh execution row.
#[derive(Debug, Clone)]
pub struct NewExecution {
    pub executor_id: i64,
    pub component_id: i64,
    pub kind: ComponentKind,
    pub image_name: String,
    pub image_tag: String,
    pub timeout: u64,
    pub kube_setting: KubeObjects,
    pub is_debug: bool,
    pub kube_master: String,
    pub input: Value,
    pub envs: Vec<Env>,
    pub notify_url: NotifyUrls,
    pub detail: String,
}

/// One run of a component.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRecord {
    pub id: i64,
    pub executor_id: i64,
    pub executor_name: String,
    pub component_id: i64,
    pub status: ExecutionStatus,
    pub kind: ComponentKind,
    pub image_name: String,
    pub image_tag: String,
    pub timeout: u64,
    pub kube_setting: KubeObjects,
    pub is_debug: bool,
    pub kube_master: String,
    pub input: Value,
    pub envs: Vec<Env>,
    pub notify_url: NotifyUrls,
    pub kube_resp: KubeObjects,
    pub detail: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExecutionRecord {
    /// Append a timestamped line to the detail log.
    pub fn append_detail(&mut self, line: impl AsRef<str>) {
        if !self.detail.is_empty() {
            self.detail.push('\n');
        }
        self.detail.push_str(&detail_line(line.as_ref()));
    }

    /// Image reference as submitted to the backend (`name[:tag]`).
    pub fn image(&self) -> String {
        if self.image_tag.is_empty() {
            self.image_name.clone()
        } else {
            format!("{}:{}", self.image_name, self.image_tag)
        }
    }
}

/// Format a detail line stamped with the current time.
pub fn detail_line(line: &str) -> String {
    format!("{} {}", Utc::now().format(DETAIL_TIME_FORMAT), line)
}

/// A persisted lifecycle event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub id: i64,
    pub execute_seq_id: i64,
    pub event_type: EventType,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
