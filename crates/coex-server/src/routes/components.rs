//! Component catalog and execution start endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use coex_domain::StartRequest;
use coex_store::{Component, ComponentFilter, ComponentSpec};
use coex_types::{ComponentKind, Env, ExecuteComponentMsg, KubeObjects, NotifyUrls};

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Maximum allowed page size.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default page size.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response types
// ─────────────────────────────────────────────────────────────────────────────

/// Component template as submitted by clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentRequest {
    pub name: String,
    pub version: String,
    /// `Kubernetes` when omitted.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub image_name: String,
    pub image_tag: String,
    pub kube_setting: KubeObjects,
    /// Seconds; negative values mean no timeout.
    pub timeout: i64,
    pub envs: Vec<Env>,
    pub input: Value,
    pub output: Value,
}

impl ComponentRequest {
    fn into_spec(self) -> Result<ComponentSpec> {
        let kind = match self.kind.as_deref() {
            None | Some("") => ComponentKind::default(),
            Some(kind) => kind
                .parse()
                .map_err(|e: coex_types::ParseError| ServerError::BadRequest(e.to_string()))?,
        };
        Ok(ComponentSpec {
            name: self.name,
            version: self.version,
            kind,
            image_name: self.image_name,
            image_tag: self.image_tag,
            kube_setting: self.kube_setting,
            timeout: u64::try_from(self.timeout).unwrap_or(0),
            envs: self.envs,
            input: self.input,
            output: self.output,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
}

/// Query parameters for listing components.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListComponentsQuery {
    pub name: Option<String>,
    pub version: Option<String>,
    /// Match `name` as a substring.
    pub fuzzy: bool,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListComponentsResponse {
    pub items: Vec<Component>,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveVersionRequest {
    pub version: String,
}

/// Body of an execute request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecuteRequest {
    /// Tenant the execution runs for; also the Kubernetes namespace.
    pub executor: String,
    pub kube_master: String,
    pub input: Value,
    pub envs: Vec<Env>,
    pub notify_url: NotifyUrls,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /v2/components
pub async fn list_components_handler(
    State(state): State<AppState>,
    Query(query): Query<ListComponentsQuery>,
) -> Result<Json<ListComponentsResponse>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);
    let items = state.catalog().list(&ComponentFilter {
        name: query.name.filter(|n| !n.is_empty()),
        version: query.version.filter(|v| !v.is_empty()),
        fuzzy: query.fuzzy,
        limit: Some(limit),
        offset: Some(offset),
    })?;
    Ok(Json(ListComponentsResponse {
        items,
        limit,
        offset,
    }))
}

/// POST /v2/components
pub async fn create_component_handler(
    State(state): State<AppState>,
    Json(request): Json<ComponentRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let component = state.catalog().create(request.into_spec()?)?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse { id: component.id }),
    ))
}

/// GET /v2/components/{id}
pub async fn get_component_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Component>> {
    Ok(Json(state.catalog().get(id)?))
}

/// PUT /v2/components/{id}
pub async fn update_component_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<ComponentRequest>,
) -> Result<Json<Component>> {
    Ok(Json(state.catalog().update(id, request.into_spec()?)?))
}

/// POST /v2/components/{id}
pub async fn save_version_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<SaveVersionRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let component = state
        .catalog()
        .save_as_new_version(id, &request.version, None)?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse { id: component.id }),
    ))
}

/// DELETE /v2/components/{id}
pub async fn delete_component_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state.catalog().delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v2/components/{id}/execute
pub async fn execute_component_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<ExecuteRequest>,
) -> Result<(StatusCode, Json<ExecuteComponentMsg>)> {
    let outcome = state
        .orchestrator()
        .start_component(StartRequest {
            component_id: id,
            executor_name: request.executor,
            backend_endpoint: request.kube_master,
            input: request.input,
            envs: request.envs,
            notify_urls: request.notify_url,
            debug: false,
            debug_prior_execution: None,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(outcome.context.message())))
}
