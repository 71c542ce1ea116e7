use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, MutexGuard};
use rusqlite::types::Type;
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use uuid::Uuid;

use coex_types::{EventType, ExecutionStatus};

use crate::lock::{LockTable, LockedExecution};
use crate::types::{
    Component, ComponentFilter, ComponentSpec, EventRecord, ExecutionRecord, Executor,
    NewExecution,
};
use crate::{Result, StoreError};

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

const COMPONENT_COLUMNS: &str = "id, name, version, kind, image_name, image_tag, kube_setting, \
     timeout, envs, input, output, created_at, updated_at";

const EXECUTION_COLUMNS: &str = "e.id, e.executor_id, x.name, e.component_id, e.status, e.kind, \
     e.image_name, e.image_tag, e.timeout, e.kube_setting, e.is_debug, e.kube_master, e.input, \
     e.envs, e.notify_url, e.kube_resp, e.detail, e.created_at, e.updated_at";

/// Thin repository over SQLite for components, executors, executions and
/// events.
///
/// Thread-safe via internal `Mutex<Connection>`. Execution rows are mutated
/// only through [`lock_execution`](Self::lock_execution) and
/// [`commit`](Self::commit).
pub struct ExecutionStore {
    conn: Mutex<Connection>,
    locks: Arc<LockTable>,
}

impl ExecutionStore {
    /// Open (or create) the database at `path` and run pending migrations.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let store = Self::from_connection(conn)?;
        info!(path = %path.display(), "Execution store opened");
        Ok(store)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let mut store = Self {
            conn: Mutex::new(conn),
            locks: Arc::new(LockTable::default()),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&mut self) -> Result<()> {
        let conn = self.conn.get_mut();
        let report = embedded::migrations::runner()
            .run(conn)
            .map_err(|e| StoreError::Migration(e.to_string()))?;
        for migration in report.applied_migrations() {
            debug!(migration = %migration, "Applied migration");
        }
        Ok(())
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }

    // ── Components ──────────────────────────────────────────────────

    pub fn create_component(&self, spec: &ComponentSpec) -> Result<Component> {
        let now = Utc::now();
        let now_str = now.to_rfc3339();

        let conn = self.conn();
        conn.execute(
            "INSERT INTO components (name, version, kind, image_name, image_tag, kube_setting,
                 timeout, envs, input, output, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
            params![
                spec.name,
                spec.version,
                spec.kind.as_str(),
                spec.image_name,
                spec.image_tag,
                to_json(&spec.kube_setting)?,
                spec.timeout as i64,
                to_json(&spec.envs)?,
                to_json(&spec.input)?,
                to_json(&spec.output)?,
                now_str,
            ],
        )
        .map_err(|e| unique_conflict(e, || component_key(spec)))?;
        let id = conn.last_insert_rowid();
        drop(conn);

        debug!(component_id = id, name = %spec.name, version = %spec.version, "Component created");
        Ok(Component {
            id,
            spec: spec.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn get_component(&self, id: i64) -> Result<Component> {
        self.conn()
            .query_row(
                &format!(
                    "SELECT {COMPONENT_COLUMNS} FROM components WHERE id = ?1 AND deleted_at IS NULL"
                ),
                params![id],
                row_to_component,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("component {id}")))
    }

    pub fn list_components(&self, filter: &ComponentFilter) -> Result<Vec<Component>> {
        let mut sql = format!("SELECT {COMPONENT_COLUMNS} FROM components WHERE deleted_at IS NULL");
        let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(name) = filter.name.as_deref().filter(|n| !n.is_empty()) {
            if filter.fuzzy {
                values.push(Box::new(format!("%{name}%")));
                sql.push_str(&format!(" AND name LIKE ?{}", values.len()));
            } else {
                values.push(Box::new(name.to_string()));
                sql.push_str(&format!(" AND name = ?{}", values.len()));
            }
        }
        if let Some(version) = filter.version.as_deref().filter(|v| !v.is_empty()) {
            values.push(Box::new(version.to_string()));
            sql.push_str(&format!(" AND version = ?{}", values.len()));
        }
        sql.push_str(" ORDER BY id");
        if filter.limit.is_some() || filter.offset.is_some() {
            // SQLite treats a negative limit as unbounded.
            let limit = filter.limit.map(i64::from).unwrap_or(-1);
            let offset = filter.offset.map(i64::from).unwrap_or(0);
            sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
        }

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let params: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let iter = stmt.query_map(params.as_slice(), row_to_component)?;
        let mut rows = Vec::new();
        for r in iter {
            rows.push(r?);
        }
        Ok(rows)
    }

    /// Overwrite the editable fields of a live component.
    pub fn update_component(&self, id: i64, spec: &ComponentSpec) -> Result<Component> {
        let now_str = Utc::now().to_rfc3339();
        let updated = self
            .conn()
            .execute(
                "UPDATE components SET name = ?1, version = ?2, kind = ?3, image_name = ?4,
                     image_tag = ?5, kube_setting = ?6, timeout = ?7, envs = ?8, input = ?9,
                     output = ?10, updated_at = ?11
                 WHERE id = ?12 AND deleted_at IS NULL",
                params![
                    spec.name,
                    spec.version,
                    spec.kind.as_str(),
                    spec.image_name,
                    spec.image_tag,
                    to_json(&spec.kube_setting)?,
                    spec.timeout as i64,
                    to_json(&spec.envs)?,
                    to_json(&spec.input)?,
                    to_json(&spec.output)?,
                    now_str,
                    id,
                ],
            )
            .map_err(|e| unique_conflict(e, || component_key(spec)))?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("component {id}")));
        }
        self.get_component(id)
    }

    /// Soft-delete; executions keep referencing the row.
    pub fn delete_component(&self, id: i64) -> Result<()> {
        let now_str = Utc::now().to_rfc3339();
        let updated = self.conn().execute(
            "UPDATE components SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
            params![now_str, id],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("component {id}")));
        }
        Ok(())
    }

    pub fn count_executions_for_component(&self, component_id: i64) -> Result<i64> {
        Ok(self.conn().query_row(
            "SELECT COUNT(*) FROM component_executions WHERE component_id = ?1",
            params![component_id],
            |row| row.get(0),
        )?)
    }

    // ── Executors ───────────────────────────────────────────────────

    pub fn get_executor(&self, name: &str) -> Result<Option<Executor>> {
        Ok(self
            .conn()
            .query_row(
                "SELECT id, name, key, created_at, updated_at FROM executors WHERE name = ?1",
                params![name],
                row_to_executor,
            )
            .optional()?)
    }

    /// Fetch the executor called `name`, creating it on first use.
    pub fn get_or_create_executor(&self, name: &str) -> Result<Executor> {
        let now_str = Utc::now().to_rfc3339();
        let key = Uuid::new_v4().simple().to_string();
        let inserted = self.conn().execute(
            "INSERT OR IGNORE INTO executors (name, key, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![name, key, now_str],
        )?;
        if inserted > 0 {
            info!(executor = %name, "Executor created");
        }
        self.get_executor(name)?
            .ok_or_else(|| StoreError::NotFound(format!("executor {name}")))
    }

    // ── Executions ──────────────────────────────────────────────────

    /// Insert a new execution in `Accepted` state with an empty `kube_resp`.
    pub fn create_execution(&self, new: &NewExecution) -> Result<ExecutionRecord> {
        let now_str = Utc::now().to_rfc3339();
        let id = {
            let conn = self.conn();
            conn.execute(
                "INSERT INTO component_executions (executor_id, component_id, status, kind,
                     image_name, image_tag, timeout, kube_setting, is_debug, kube_master, input,
                     envs, notify_url, kube_resp, detail, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, '{}', ?14, ?15, ?15)",
                params![
                    new.executor_id,
                    new.component_id,
                    ExecutionStatus::Accepted.as_str(),
                    new.kind.as_str(),
                    new.image_name,
                    new.image_tag,
                    new.timeout as i64,
                    to_json(&new.kube_setting)?,
                    new.is_debug as i32,
                    new.kube_master,
                    to_json(&new.input)?,
                    to_json(&new.envs)?,
                    to_json(&new.notify_url)?,
                    new.detail,
                    now_str,
                ],
            )?;
            conn.last_insert_rowid()
        };
        debug!(execution_id = id, component_id = new.component_id, "Execution created");
        self.get_execution(id)
    }

    /// Read an execution without locking it.
    pub fn get_execution(&self, id: i64) -> Result<ExecutionRecord> {
        self.conn()
            .query_row(
                &format!(
                    "SELECT {EXECUTION_COLUMNS} FROM component_executions e
                     JOIN executors x ON x.id = e.executor_id WHERE e.id = ?1"
                ),
                params![id],
                row_to_execution,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("execution {id}")))
    }

    /// Acquire the exclusive lock for execution `id`, then read it.
    ///
    /// Waits while another task holds the lock. The row is read after the
    /// lock is granted, so the caller always sees the latest committed state.
    pub async fn lock_execution(&self, id: i64) -> Result<LockedExecution> {
        let guard = self.locks.acquire(id).await;
        let record = self.get_execution(id)?;
        Ok(LockedExecution::new(record, guard))
    }

    /// Persist status, `kube_resp` and detail of a locked execution in one
    /// statement, then release its lock.
    pub fn commit(&self, locked: LockedExecution) -> Result<ExecutionRecord> {
        let (mut record, guard) = locked.into_parts();
        let now = Utc::now();
        let updated = self.conn().execute(
            "UPDATE component_executions SET status = ?1, kube_resp = ?2, detail = ?3,
                 updated_at = ?4
             WHERE id = ?5",
            params![
                record.status.as_str(),
                to_json(&record.kube_resp)?,
                record.detail,
                now.to_rfc3339(),
                record.id,
            ],
        )?;
        drop(guard);
        if updated == 0 {
            return Err(StoreError::NotFound(format!("execution {}", record.id)));
        }
        record.updated_at = now;
        debug!(execution_id = record.id, status = %record.status, "Execution committed");
        Ok(record)
    }

    // ── Events ──────────────────────────────────────────────────────

    /// Append a lifecycle event. Events are never updated or removed.
    pub fn append_event(
        &self,
        execute_seq_id: i64,
        event_type: EventType,
        content: &str,
    ) -> Result<EventRecord> {
        let now = Utc::now();
        let conn = self.conn();
        conn.execute(
            "INSERT INTO events (execute_seq_id, type, content, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![execute_seq_id, event_type.as_str(), content, now.to_rfc3339()],
        )?;
        Ok(EventRecord {
            id: conn.last_insert_rowid(),
            execute_seq_id,
            event_type,
            content: content.to_string(),
            created_at: now,
        })
    }

    /// Events of one execution in arrival order.
    pub fn list_events(&self, execute_seq_id: i64) -> Result<Vec<EventRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, execute_seq_id, type, content, created_at
             FROM events WHERE execute_seq_id = ?1 ORDER BY id",
        )?;
        let iter = stmt.query_map(params![execute_seq_id], row_to_event)?;
        let mut events = Vec::new();
        for e in iter {
            events.push(e?);
        }
        Ok(events)
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn parse_dt(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn json_col<T: DeserializeOwned>(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parsed_col<T>(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn component_key(spec: &ComponentSpec) -> String {
    format!("component {}:{} already exists", spec.name, spec.version)
}

fn unique_conflict(err: rusqlite::Error, message: impl FnOnce() -> String) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            StoreError::Conflict(message())
        }
        _ => StoreError::Database(err),
    }
}

fn row_to_component(row: &rusqlite::Row<'_>) -> rusqlite::Result<Component> {
    Ok(Component {
        id: row.get(0)?,
        spec: ComponentSpec {
            name: row.get(1)?,
            version: row.get(2)?,
            kind: parsed_col(row, 3)?,
            image_name: row.get(4)?,
            image_tag: row.get(5)?,
            kube_setting: json_col(row, 6)?,
            timeout: row.get::<_, i64>(7)?.max(0) as u64,
            envs: json_col(row, 8)?,
            input: json_col(row, 9)?,
            output: json_col(row, 10)?,
        },
        created_at: parse_dt(&row.get::<_, String>(11)?),
        updated_at: parse_dt(&row.get::<_, String>(12)?),
    })
}

fn row_to_executor(row: &rusqlite::Row<'_>) -> rusqlite::Result<Executor> {
    Ok(Executor {
        id: row.get(0)?,
        name: row.get(1)?,
        key: row.get(2)?,
        created_at: parse_dt(&row.get::<_, String>(3)?),
        updated_at: parse_dt(&row.get::<_, String>(4)?),
    })
}

fn row_to_execution(row: &rusqlite::Row<'_>) -> rusqlite::Result<ExecutionRecord> {
    Ok(ExecutionRecord {
        id: row.get(0)?,
        executor_id: row.get(1)?,
        executor_name: row.get(2)?,
        component_id: row.get(3)?,
        status: parsed_col(row, 4)?,
        kind: parsed_col(row, 5)?,
        image_name: row.get(6)?,
        image_tag: row.get(7)?,
        timeout: row.get::<_, i64>(8)?.max(0) as u64,
        kube_setting: json_col(row, 9)?,
        is_debug: row.get::<_, i32>(10)? != 0,
        kube_master: row.get(11)?,
        input: json_col(row, 12)?,
        envs: json_col(row, 13)?,
        notify_url: json_col(row, 14)?,
        kube_resp: json_col(row, 15)?,
        detail: row.get(16)?,
        created_at: parse_dt(&row.get::<_, String>(17)?),
        updated_at: parse_dt(&row.get::<_, String>(18)?),
    })
}

fn row_to_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<EventRecord> {
    Ok(EventRecord {
        id: row.get(0)?,
        execute_seq_id: row.get(1)?,
        event_type: parsed_col(row, 2)?,
        content: row.get(3)?,
        created_at: parse_dt(&row.get::<_, String>(4)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use coex_types::{ComponentKind, Env, KubeObjects, NotifyUrls};
    use serde_json::json;

    fn test_store() -> ExecutionStore {
        ExecutionStore::open_in_memory().expect("failed to open in-memory store")
    }

    fn spec(name: &str, version: &str) -> ComponentSpec {
        ComponentSpec {
            name: name.into(),
            version: version.into(),
            kind: ComponentKind::Kubernetes,
            image_name: "busybox".into(),
            image_tag: "1.36".into(),
            kube_setting: KubeObjects {
                pod: Some(json!({"spec": {"containers": [{"command": ["true"]}]}})),
                service: None,
            },
            timeout: 30,
            envs: vec![Env::new("MODE", "batch")],
            input: json!({"type": "object"}),
            output: json!(null),
        }
    }

    fn new_execution(store: &ExecutionStore, component: &Component) -> NewExecution {
        let executor = store.get_or_create_executor("team-a").unwrap();
        NewExecution {
            executor_id: executor.id,
            component_id: component.id,
            kind: component.spec.kind,
            image_name: component.spec.image_name.clone(),
            image_tag: component.spec.image_tag.clone(),
            timeout: component.spec.timeout,
            kube_setting: component.spec.kube_setting.clone(),
            is_debug: false,
            kube_master: "http://k8s:8080".into(),
            input: json!({"n": 1}),
            envs: component.spec.envs.clone(),
            notify_url: NotifyUrls {
                status_changed: "http://hooks/status".into(),
                ..Default::default()
            },
            detail: "created".into(),
        }
    }

    #[test]
    fn test_migrations_run() {
        let _store = test_store();
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coex.db");
        {
            let store = ExecutionStore::open(&path).unwrap();
            store.create_component(&spec("echo", "1")).unwrap();
        }
        let store = ExecutionStore::open(&path).unwrap();
        assert_eq!(store.list_components(&ComponentFilter::default()).unwrap().len(), 1);
    }

    #[test]
    fn test_component_crud() {
        let store = test_store();
        let created = store.create_component(&spec("echo", "1.0")).unwrap();
        let fetched = store.get_component(created.id).unwrap();
        assert_eq!(fetched.spec, created.spec);

        let mut changed = created.spec.clone();
        changed.timeout = 60;
        let updated = store.update_component(created.id, &changed).unwrap();
        assert_eq!(updated.spec.timeout, 60);

        store.delete_component(created.id).unwrap();
        assert!(store.get_component(created.id).unwrap_err().is_not_found());
        assert!(store.delete_component(created.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_duplicate_name_version_conflicts() {
        let store = test_store();
        let first = store.create_component(&spec("echo", "1.0")).unwrap();
        let err = store.create_component(&spec("echo", "1.0")).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // A deleted row frees its name/version pair.
        store.delete_component(first.id).unwrap();
        store.create_component(&spec("echo", "1.0")).unwrap();
    }

    #[test]
    fn test_list_components_filters() {
        let store = test_store();
        store.create_component(&spec("echo", "1.0")).unwrap();
        store.create_component(&spec("echo", "2.0")).unwrap();
        store.create_component(&spec("echo-server", "1.0")).unwrap();

        let exact = store
            .list_components(&ComponentFilter {
                name: Some("echo".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(exact.len(), 2);

        let fuzzy = store
            .list_components(&ComponentFilter {
                name: Some("cho".into()),
                fuzzy: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(fuzzy.len(), 3);

        let versioned = store
            .list_components(&ComponentFilter {
                version: Some("1.0".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(versioned.len(), 2);

        let page = store
            .list_components(&ComponentFilter {
                offset: Some(1),
                limit: Some(1),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].spec.version, "2.0");
    }

    #[test]
    fn test_executor_created_once() {
        let store = test_store();
        let first = store.get_or_create_executor("team-a").unwrap();
        let again = store.get_or_create_executor("team-a").unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(first.key, again.key);
        assert!(store.get_executor("team-b").unwrap().is_none());
    }

    #[test]
    fn test_create_execution_starts_accepted() {
        let store = test_store();
        let component = store.create_component(&spec("echo", "1.0")).unwrap();
        let record = store
            .create_execution(&new_execution(&store, &component))
            .unwrap();

        assert_eq!(record.status, ExecutionStatus::Accepted);
        assert_eq!(record.executor_name, "team-a");
        assert!(record.kube_resp.is_empty());
        assert_eq!(record.notify_url.status_changed, "http://hooks/status");
        assert_eq!(store.count_executions_for_component(component.id).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_commit_persists_status_and_detail() {
        let store = test_store();
        let component = store.create_component(&spec("echo", "1.0")).unwrap();
        let record = store
            .create_execution(&new_execution(&store, &component))
            .unwrap();

        let mut locked = store.lock_execution(record.id).await.unwrap();
        locked.status = ExecutionStatus::Started;
        locked.append_detail("received component_start event, status is started.");
        locked.kube_resp.pod = Some(json!({"metadata": {"name": "co-pod-1"}}));
        store.commit(locked).unwrap();

        let fetched = store.get_execution(record.id).unwrap();
        assert_eq!(fetched.status, ExecutionStatus::Started);
        assert!(fetched.detail.starts_with("created\n"));
        assert!(fetched.kube_resp.pod.is_some());
        assert!(fetched.kube_resp.service.is_none());
    }

    #[tokio::test]
    async fn test_rollback_discards_changes() {
        let store = test_store();
        let component = store.create_component(&spec("echo", "1.0")).unwrap();
        let record = store
            .create_execution(&new_execution(&store, &component))
            .unwrap();

        let mut locked = store.lock_execution(record.id).await.unwrap();
        locked.status = ExecutionStatus::Failed;
        locked.rollback();

        assert_eq!(
            store.get_execution(record.id).unwrap().status,
            ExecutionStatus::Accepted
        );
        // Lock was released.
        let _again = store.lock_execution(record.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_lock_missing_execution() {
        let store = test_store();
        let err = store.lock_execution(404).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.locks.len(), 0);
    }

    #[test]
    fn test_events_are_ordered() {
        let store = test_store();
        let component = store.create_component(&spec("echo", "1.0")).unwrap();
        let record = store
            .create_execution(&new_execution(&store, &component))
            .unwrap();

        store
            .append_event(record.id, EventType::ComponentStart, "up")
            .unwrap();
        store
            .append_event(record.id, EventType::ComponentResult, "{\"ok\":true}")
            .unwrap();

        let events = store.list_events(record.id).unwrap();
        let kinds: Vec<_> = events.iter().map(|e| e.event_type).collect();
        assert_eq!(kinds, [EventType::ComponentStart, EventType::ComponentResult]);
        assert!(store.list_events(record.id + 1).unwrap().is_empty());
    }
}
