//! Read model over an execution and its events.

use coex_store::{EventRecord, ExecutionRecord};
use coex_types::{EventMsg, ExecuteComponentMsg, ExecutionStatus, KubeObjects, NotifyUrls};

/// Snapshot of one execution as seen by consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionContext {
    record: ExecutionRecord,
    events: Vec<EventRecord>,
}

impl ExecutionContext {
    pub fn new(record: ExecutionRecord, events: Vec<EventRecord>) -> Self {
        Self { record, events }
    }

    pub fn id(&self) -> i64 {
        self.record.id
    }

    pub fn component_id(&self) -> i64 {
        self.record.component_id
    }

    pub fn executor_name(&self) -> &str {
        &self.record.executor_name
    }

    pub fn status(&self) -> ExecutionStatus {
        self.record.status
    }

    pub fn is_debug(&self) -> bool {
        self.record.is_debug
    }

    pub fn timeout(&self) -> u64 {
        self.record.timeout
    }

    pub fn kube_master(&self) -> &str {
        &self.record.kube_master
    }

    pub fn notify_urls(&self) -> &NotifyUrls {
        &self.record.notify_url
    }

    pub fn kube_resp(&self) -> &KubeObjects {
        &self.record.kube_resp
    }

    pub fn detail(&self) -> &str {
        &self.record.detail
    }

    /// Detail log split into lines.
    pub fn detail_lines(&self) -> impl Iterator<Item = &str> {
        self.record.detail.lines()
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn record(&self) -> &ExecutionRecord {
        &self.record
    }

    /// Payload carrying every recorded event.
    pub fn message(&self) -> ExecuteComponentMsg {
        self.message_with(self.events.iter().map(event_msg).collect())
    }

    /// Payload carrying only `events`.
    pub fn message_with(&self, events: Vec<EventMsg>) -> ExecuteComponentMsg {
        let r = &self.record;
        ExecuteComponentMsg {
            execute_seq_id: r.id,
            component_id: r.component_id,
            status: r.status,
            kind: r.kind,
            image_name: r.image_name.clone(),
            image_tag: r.image_tag.clone(),
            timeout: r.timeout,
            kube_master: r.kube_master.clone(),
            kube_setting: r.kube_setting.clone(),
            input: r.input.clone(),
            envs: r.envs.clone(),
            notify_url: r.notify_url.clone(),
            kube_resp: r.kube_resp.clone(),
            detail: r.detail.clone(),
            events,
        }
    }
}

pub fn event_msg(event: &EventRecord) -> EventMsg {
    EventMsg {
        execute_seq_id: event.execute_seq_id,
        event_type: event.event_type,
        content: event.content.clone(),
        create_at: event.created_at,
    }
}
