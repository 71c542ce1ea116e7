//! Execution orchestrator.
//!
//! Owns start, stop and event ingestion for component executions, plus the
//! timeout watchdog. Every status change happens while holding the
//! execution's record lock from [`ExecutionStore::lock_execution`], and the
//! lock stays held across the backend calls gated by that status check. A
//! second contender (the watchdog, a late event, an explicit stop) waits,
//! re-reads the committed status, and proceeds or backs off.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, info, warn};
use url::Url;

use coex_kube::{BackendConnector, KubeError, ObjectKind, SharedBackend, WorkloadSpec, object_name};
use coex_session::{DebugSessionRegistry, DebugSubscription};
use coex_store::{ExecutionRecord, ExecutionStore, LockedExecution, NewExecution, types::detail_line};
use coex_types::{ComponentKind, Env, EventType, ExecutionStatus, KubeObjects, NotifyUrls};

use crate::context::{ExecutionContext, event_msg};
use crate::error::{DomainError, Result};
use crate::notifier::Notifier;
use crate::state;

/// Executor that debug runs are attributed to.
pub const DEBUG_EXECUTOR: &str = "component-debug";

/// Path the workload posts lifecycle events to, relative to the service URL.
pub const EVENTS_PATH: &str = "/v2/events";

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Externally reachable base URL of this service.
    pub service_url: String,
    /// Executor name used for debug runs.
    pub debug_executor: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            service_url: "http://127.0.0.1:7300".to_string(),
            debug_executor: DEBUG_EXECUTOR.to_string(),
        }
    }
}

impl OrchestratorConfig {
    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = url.into();
        self
    }

    /// Callback URL injected into workloads.
    pub fn event_url(&self) -> String {
        format!("{}{}", self.service_url.trim_end_matches('/'), EVENTS_PATH)
    }
}

/// Request to run a component.
#[derive(Debug, Clone, Default)]
pub struct StartRequest {
    pub component_id: i64,
    /// Tenant / namespace. Ignored for debug runs.
    pub executor_name: String,
    /// Kubernetes API server URL.
    pub backend_endpoint: String,
    pub input: Value,
    /// Added to the component's envs; same-key entries override.
    pub envs: Vec<Env>,
    pub notify_urls: NotifyUrls,
    pub debug: bool,
    /// Execution id of an earlier debug run by the same client.
    pub debug_prior_execution: Option<i64>,
}

/// Result of [`Orchestrator::start_component`].
#[derive(Debug)]
pub struct StartOutcome {
    pub context: ExecutionContext,
    /// Notification stream for debug runs.
    pub debug: Option<DebugSubscription>,
}

struct Inner {
    store: Arc<ExecutionStore>,
    connector: Arc<dyn BackendConnector>,
    notifier: Notifier,
    sessions: DebugSessionRegistry,
    config: OrchestratorConfig,
}

/// Drives component executions through their lifecycle.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

impl Orchestrator {
    pub fn new(
        store: Arc<ExecutionStore>,
        connector: Arc<dyn BackendConnector>,
        notifier: Notifier,
        sessions: DebugSessionRegistry,
        config: OrchestratorConfig,
    ) -> Self {
        info!(service_url = %config.service_url, "Initializing execution orchestrator");
        Self {
            inner: Arc::new(Inner {
                store,
                connector,
                notifier,
                sessions,
                config,
            }),
        }
    }

    pub fn store(&self) -> &Arc<ExecutionStore> {
        &self.inner.store
    }

    pub fn sessions(&self) -> &DebugSessionRegistry {
        &self.inner.sessions
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.inner.config
    }

    // ── Entry points ────────────────────────────────────────────────

    /// Validate `request`, create an `Accepted` execution and start it in
    /// the background.
    pub async fn start_component(&self, request: StartRequest) -> Result<StartOutcome> {
        let executor_name = if request.debug {
            self.inner.config.debug_executor.clone()
        } else {
            request.executor_name.trim().to_string()
        };
        validate_start(&request, &executor_name)?;

        let component = self.inner.store.get_component(request.component_id)?;
        if component.spec.kind != ComponentKind::Kubernetes {
            return Err(DomainError::Unsupported(
                "currently only kubernetes component supported".to_string(),
            ));
        }

        if request.debug
            && let Some(prior) = request.debug_prior_execution.filter(|id| *id > 0)
            && self.inner.sessions.invalidate(prior).await
        {
            debug!(execution_id = prior, "Closed previous debug session");
        }

        let executor = self.inner.store.get_or_create_executor(&executor_name)?;
        let backend = self.inner.connector.connect(&request.backend_endpoint)?;
        backend.ensure_namespace(&executor.name).await?;

        let record = self.inner.store.create_execution(&NewExecution {
            executor_id: executor.id,
            component_id: component.id,
            kind: component.spec.kind,
            image_name: component.spec.image_name.clone(),
            image_tag: component.spec.image_tag.clone(),
            timeout: component.spec.timeout,
            kube_setting: component.spec.kube_setting.clone(),
            is_debug: request.debug,
            kube_master: request.backend_endpoint.clone(),
            input: request.input,
            envs: merge_envs(&component.spec.envs, &request.envs),
            notify_url: request.notify_urls,
            detail: detail_line("successfully created execution, status is accepted."),
        })?;
        info!(
            execution_id = record.id,
            component_id = component.id,
            executor = %executor.name,
            debug = record.is_debug,
            "Execution accepted"
        );

        let debug = if record.is_debug {
            Some(self.inner.sessions.open(record.id).await)
        } else {
            None
        };

        let id = record.id;
        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.start(id).await {
                warn!(execution_id = id, error = %e, "Start did not run");
            }
        });

        Ok(StartOutcome {
            context: ExecutionContext::new(record, Vec::new()),
            debug,
        })
    }

    /// Materialize the workload of an `Accepted` execution.
    ///
    /// Arms the watchdog when the execution has a timeout. A creation
    /// failure marks the execution `Failed` and schedules teardown of
    /// whatever was recorded.
    pub async fn start(&self, id: i64) -> Result<()> {
        if id <= 0 {
            return Err(DomainError::Validation(format!("invalid execution id {id}")));
        }
        let mut locked = self.inner.store.lock_execution(id).await?;
        if locked.status != ExecutionStatus::Accepted {
            let status = locked.status;
            locked.rollback();
            return Err(DomainError::Precondition(format!(
                "execution {id} is {status}, expected accepted"
            )));
        }

        if locked.timeout > 0 {
            self.arm_watchdog(id, Duration::from_secs(locked.timeout));
        }

        let (kube_resp, outcome) = self.create_resources(&locked).await;
        locked.kube_resp = kube_resp;
        let failed = match outcome {
            Ok(()) => {
                locked.append_detail("successfully created kubernetes resource, status is accepted.");
                false
            }
            Err(e) => {
                error!(execution_id = id, error = %e, "Failed to create kubernetes resources");
                set_status(&mut locked, ExecutionStatus::Failed);
                locked.append_detail(format!(
                    "failed to create kubernetes resource: {e}, status is failed."
                ));
                true
            }
        };
        self.inner.store.commit(locked)?;

        if failed {
            self.spawn_teardown(id);
        } else {
            info!(execution_id = id, "Kubernetes resources created");
        }
        Ok(())
    }

    /// Tear down the workload and mark the execution stopped.
    pub async fn stop(&self, id: i64) -> Result<ExecutionContext> {
        if id <= 0 {
            return Err(DomainError::Validation(format!("invalid execution id {id}")));
        }
        let mut locked = self.inner.store.lock_execution(id).await?;
        if !state::can_stop(locked.status) {
            let status = locked.status;
            locked.rollback();
            return Err(DomainError::Precondition(format!(
                "execution {id} is already {status}"
            )));
        }

        self.stop_locked(&mut locked).await;
        let record = self.inner.store.commit(locked)?;
        let ctx = self.context(record)?;
        self.inner.notifier.status_changed(&ctx).await;
        Ok(ctx)
    }

    /// Record a lifecycle event and apply its transition.
    ///
    /// The event is stored even when the transition is rejected; the
    /// rejection is returned as [`DomainError::Precondition`]. A
    /// notification carrying the event is sent either way.
    pub async fn receive_event(
        &self,
        id: i64,
        event_type: EventType,
        content: &str,
    ) -> Result<ExecutionContext> {
        if id <= 0 {
            return Err(DomainError::Validation(format!("invalid execution id {id}")));
        }
        let mut locked = self.inner.store.lock_execution(id).await?;
        let event = self.inner.store.append_event(id, event_type, content)?;
        let current = locked.status;

        let accepted = match event_type {
            EventType::ComponentStop if state::can_stop(current) => {
                locked.append_detail("received component_stop event, going to stop execution.");
                self.stop_locked(&mut locked).await;
                true
            }
            EventType::ComponentStop => false,
            EventType::ComponentStart | EventType::ComponentResult => {
                match state::event_target(current, event_type) {
                    Some(next) => {
                        set_status(&mut locked, next);
                        locked.append_detail(format!(
                            "received {event_type} event, status is {next}."
                        ));
                        true
                    }
                    None => false,
                }
            }
        };

        let record = if accepted {
            self.inner.store.commit(locked)?
        } else {
            let record = ExecutionRecord::clone(&locked);
            locked.rollback();
            record
        };
        let ctx = self.context(record)?;

        // Inline so a later status change cannot overtake this event on the
        // debug channel; webhook delivery is spawned by the notifier.
        self.inner
            .notifier
            .event_received(&ctx, &event_msg(&event))
            .await;

        if accepted {
            info!(execution_id = id, event = %event_type, status = %ctx.status(), "Event applied");
            Ok(ctx)
        } else {
            warn!(execution_id = id, event = %event_type, status = %current, "Event rejected");
            Err(DomainError::Precondition(format!(
                "{event_type} not allowed while execution {id} is {current}"
            )))
        }
    }

    /// Current state of an execution, or `None` if it does not exist.
    pub async fn get_execution(
        &self,
        id: i64,
        with_events: bool,
    ) -> Result<Option<ExecutionContext>> {
        let record = match self.inner.store.get_execution(id) {
            Ok(record) => record,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let events = if with_events {
            self.inner.store.list_events(id)?
        } else {
            Vec::new()
        };
        Ok(Some(ExecutionContext::new(record, events)))
    }

    // ── Watchdog ────────────────────────────────────────────────────

    fn arm_watchdog(&self, id: i64, timeout: Duration) {
        debug!(execution_id = id, timeout_secs = timeout.as_secs(), "Watchdog armed");
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Err(e) = this.on_timeout(id).await {
                warn!(execution_id = id, error = %e, "Watchdog failed");
            }
        });
    }

    /// Fire the watchdog for `id`. Returns whether it marked the execution
    /// failed; a finished or terminal execution is left untouched.
    pub async fn on_timeout(&self, id: i64) -> Result<bool> {
        let mut locked = self.inner.store.lock_execution(id).await?;
        if !state::watchdog_applies(locked.status) {
            debug!(execution_id = id, status = %locked.status, "Watchdog fired after completion");
            locked.rollback();
            return Ok(false);
        }

        set_status(&mut locked, ExecutionStatus::Failed);
        locked.append_detail("execution is timeout.");
        self.inner.store.commit(locked)?;
        warn!(execution_id = id, "Execution timed out");

        self.spawn_teardown(id);
        Ok(true)
    }

    // ── Resources ───────────────────────────────────────────────────

    /// Create the service, then the pod. Returns what should be recorded in
    /// `kube_resp` (created objects, or the submitted spec for anything
    /// that failed or was never attempted) and the first error.
    async fn create_resources(&self, record: &ExecutionRecord) -> (KubeObjects, Result<()>) {
        let setting = &record.kube_setting;
        let spec = WorkloadSpec {
            execution_id: record.id,
            namespace: &record.executor_name,
            image: record.image(),
            timeout: record.timeout,
            input: &record.input,
            event_url: self.inner.config.event_url(),
            envs: &record.envs,
        };

        let mut resp = KubeObjects::default();
        let mut planned = Vec::new();
        for (kind, template) in [
            (ObjectKind::Service, setting.service.as_ref()),
            (ObjectKind::Pod, setting.pod.as_ref()),
        ] {
            let Some(template) = template else { continue };
            let rendered = match kind {
                ObjectKind::Service => spec.render_service(template),
                ObjectKind::Pod => spec.render_pod(template),
            };
            match rendered {
                Ok(object) => planned.push((kind, object)),
                Err(e) => {
                    *slot(&mut resp, kind) = Some(template.clone());
                    for (kind, object) in planned {
                        *slot(&mut resp, kind) = Some(object);
                    }
                    return (resp, Err(e.into()));
                }
            }
        }

        let backend = match self.inner.connector.connect(&record.kube_master) {
            Ok(backend) => backend,
            Err(e) => {
                for (kind, object) in planned {
                    *slot(&mut resp, kind) = Some(object);
                }
                return (resp, Err(e.into()));
            }
        };

        let mut outcome = Ok(());
        for (kind, object) in planned {
            if outcome.is_err() {
                *slot(&mut resp, kind) = Some(object);
                continue;
            }
            match backend
                .create_object(kind, &record.executor_name, &object)
                .await
            {
                Ok(created) => *slot(&mut resp, kind) = Some(created),
                Err(e) => {
                    *slot(&mut resp, kind) = Some(object);
                    outcome = Err(DomainError::Backend(e));
                }
            }
        }
        (resp, outcome)
    }

    /// Delete whatever `kube_resp` records, tolerating objects already gone.
    async fn delete_resources(&self, record: &ExecutionRecord) -> std::result::Result<(), String> {
        let recorded: Vec<_> = [
            (ObjectKind::Pod, record.kube_resp.pod.as_ref()),
            (ObjectKind::Service, record.kube_resp.service.as_ref()),
        ]
        .into_iter()
        .filter_map(|(kind, object)| object.map(|o| (kind, object_name(kind, record.id, o))))
        .collect();
        if recorded.is_empty() {
            return Ok(());
        }

        let backend: SharedBackend = self
            .inner
            .connector
            .connect(&record.kube_master)
            .map_err(|e| e.to_string())?;

        let mut errors = Vec::new();
        for (kind, name) in recorded {
            match backend
                .delete_object(kind, &record.executor_name, &name)
                .await
            {
                Ok(()) => debug!(execution_id = record.id, %kind, name = %name, "Deleted object"),
                Err(KubeError::NotFound(_)) => {
                    debug!(execution_id = record.id, %kind, name = %name, "Object already gone")
                }
                Err(e) => errors.push(format!("delete {kind} error: {e}")),
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join(", "))
        }
    }

    /// Tear down a stoppable execution under its lock and set the outcome.
    async fn stop_locked(&self, locked: &mut LockedExecution) {
        match self.delete_resources(locked).await {
            Ok(()) => {
                set_status(locked, ExecutionStatus::Stopped);
                locked.append_detail("successfully deleted kubernetes resource, status is stopped.");
                info!(execution_id = locked.id, "Execution stopped");
            }
            Err(e) => {
                set_status(locked, ExecutionStatus::Failed);
                locked.append_detail(format!(
                    "failed to delete kubernetes resource: {e}, status is failed."
                ));
                error!(execution_id = locked.id, error = %e, "Teardown failed");
            }
        }
    }

    fn spawn_teardown(&self, id: i64) {
        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.teardown(id).await {
                error!(execution_id = id, error = %e, "Compensating teardown failed");
            }
        });
    }

    /// Compensating teardown after a failed start or a timeout. The
    /// execution stays `Failed`.
    async fn teardown(&self, id: i64) -> Result<()> {
        let mut locked = self.inner.store.lock_execution(id).await?;
        if locked.status != ExecutionStatus::Failed {
            locked.rollback();
            return Ok(());
        }
        match self.delete_resources(&locked).await {
            Ok(()) => locked.append_detail("successfully deleted kubernetes resource, status is failed."),
            Err(e) => locked.append_detail(format!(
                "failed to delete kubernetes resource: {e}, status is failed."
            )),
        }
        let record = self.inner.store.commit(locked)?;
        let ctx = self.context(record)?;
        self.inner.notifier.status_changed(&ctx).await;
        Ok(())
    }

    fn context(&self, record: ExecutionRecord) -> Result<ExecutionContext> {
        let events = self.inner.store.list_events(record.id)?;
        Ok(ExecutionContext::new(record, events))
    }
}

fn set_status(locked: &mut LockedExecution, to: ExecutionStatus) {
    debug_assert!(
        state::is_allowed(locked.status, to),
        "illegal transition {} -> {to} for execution {}",
        locked.status,
        locked.id
    );
    locked.status = to;
}

fn slot(objects: &mut KubeObjects, kind: ObjectKind) -> &mut Option<Value> {
    match kind {
        ObjectKind::Pod => &mut objects.pod,
        ObjectKind::Service => &mut objects.service,
    }
}

fn validate_start(request: &StartRequest, executor_name: &str) -> Result<()> {
    if request.component_id <= 0 {
        return Err(DomainError::Validation(format!(
            "invalid component id {}",
            request.component_id
        )));
    }
    if executor_name.is_empty() {
        return Err(DomainError::Validation("executor name is required".into()));
    }
    if request.backend_endpoint.is_empty() {
        return Err(DomainError::Validation("kube master is required".into()));
    }
    validate_http_url("kube master", &request.backend_endpoint)?;
    for (name, url) in request.notify_urls.iter() {
        validate_http_url(name, url)?;
    }
    Ok(())
}

fn validate_http_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| DomainError::Validation(format!("{field} {value:?} is not a url: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(DomainError::Validation(format!(
            "{field} must use http or https, got {other}"
        ))),
    }
}

/// Component envs followed by request envs; a request entry replaces a
/// component entry with the same key.
fn merge_envs(component: &[Env], request: &[Env]) -> Vec<Env> {
    let mut merged: Vec<Env> = component
        .iter()
        .filter(|env| !request.iter().any(|r| r.key == env.key))
        .cloned()
        .collect();
    merged.extend(request.iter().cloned());
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> StartRequest {
        StartRequest {
            component_id: 1,
            executor_name: "team-a".into(),
            backend_endpoint: "http://k8s:8080".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_start_accepts_minimal_request() {
        validate_start(&request(), "team-a").unwrap();
    }

    #[test]
    fn test_validate_start_rejects_bad_input() {
        let mut r = request();
        r.component_id = 0;
        assert!(matches!(validate_start(&r, "team-a"), Err(DomainError::Validation(_))));

        assert!(matches!(validate_start(&request(), ""), Err(DomainError::Validation(_))));

        let mut r = request();
        r.backend_endpoint = "tcp://k8s:8080".into();
        assert!(matches!(validate_start(&r, "team-a"), Err(DomainError::Validation(_))));

        let mut r = request();
        r.backend_endpoint.clear();
        assert!(matches!(validate_start(&r, "team-a"), Err(DomainError::Validation(_))));

        let mut r = request();
        r.notify_urls.component_result = "ftp://hooks".into();
        assert!(matches!(validate_start(&r, "team-a"), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_merge_envs_request_wins() {
        let merged = merge_envs(
            &[Env::new("A", "1"), Env::new("B", "2")],
            &[Env::new("B", "3"), Env::new("C", "4")],
        );
        assert_eq!(
            merged,
            vec![Env::new("A", "1"), Env::new("B", "3"), Env::new("C", "4")]
        );
    }

    #[test]
    fn test_event_url() {
        let config = OrchestratorConfig::default().with_service_url("http://coex.local:7300/");
        assert_eq!(config.event_url(), "http://coex.local:7300/v2/events");
    }

    async fn locked_execution(store: &ExecutionStore) -> LockedExecution {
        let component = store
            .create_component(&coex_store::ComponentSpec {
                name: "echo".into(),
                version: "1".into(),
                image_name: "busybox".into(),
                ..Default::default()
            })
            .unwrap();
        let executor = store.get_or_create_executor("team-a").unwrap();
        let record = store
            .create_execution(&NewExecution {
                executor_id: executor.id,
                component_id: component.id,
                kind: ComponentKind::Kubernetes,
                image_name: "busybox".into(),
                image_tag: String::new(),
                timeout: 0,
                kube_setting: KubeObjects::default(),
                is_debug: false,
                kube_master: "http://k8s:8080".into(),
                input: Value::Null,
                envs: Vec::new(),
                notify_url: NotifyUrls::default(),
                detail: String::new(),
            })
            .unwrap();
        store.lock_execution(record.id).await.unwrap()
    }

    #[tokio::test]
    async fn test_set_status_follows_table() {
        let store = ExecutionStore::open_in_memory().unwrap();
        let mut locked = locked_execution(&store).await;
        set_status(&mut locked, ExecutionStatus::Started);
        set_status(&mut locked, ExecutionStatus::Finished);
        set_status(&mut locked, ExecutionStatus::Stopped);
        assert_eq!(locked.status, ExecutionStatus::Stopped);
    }

    #[tokio::test]
    #[should_panic(expected = "illegal transition")]
    async fn test_set_status_rejects_leaving_terminal() {
        let store = ExecutionStore::open_in_memory().unwrap();
        let mut locked = locked_execution(&store).await;
        set_status(&mut locked, ExecutionStatus::Failed);
        set_status(&mut locked, ExecutionStatus::Started);
    }
}
