//! Execution status and stop endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use coex_types::ExecuteComponentMsg;

use crate::error::{Result, ServerError};
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GetExecutionQuery {
    /// Include the recorded events.
    pub events: bool,
}

/// GET /v2/executions/{id}
pub async fn get_execution_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<GetExecutionQuery>,
) -> Result<Json<ExecuteComponentMsg>> {
    let ctx = state
        .orchestrator()
        .get_execution(id, query.events)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("execution {id}")))?;
    Ok(Json(ctx.message()))
}

/// DELETE /v2/executions/{id}
pub async fn stop_execution_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ExecuteComponentMsg>> {
    let ctx = state.orchestrator().stop(id).await?;
    Ok(Json(ctx.message()))
}
