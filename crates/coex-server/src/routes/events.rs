//! Lifecycle event ingestion from running workloads.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use coex_types::{EventType, ExecutionStatus};

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Body posted by a workload to the callback URL it was given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRequest {
    pub execute_seq_id: i64,
    /// `component_start`, `component_result` or `component_stop`.
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    pub execute_seq_id: i64,
    pub status: ExecutionStatus,
}

/// POST /v2/events
pub async fn receive_event_handler(
    State(state): State<AppState>,
    Json(request): Json<EventRequest>,
) -> Result<(StatusCode, Json<EventResponse>)> {
    let event_type: EventType = request
        .event_type
        .parse()
        .map_err(|e: coex_types::ParseError| ServerError::BadRequest(e.to_string()))?;

    let ctx = state
        .orchestrator()
        .receive_event(request.execute_seq_id, event_type, &request.content)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(EventResponse {
            execute_seq_id: ctx.id(),
            status: ctx.status(),
        }),
    ))
}
