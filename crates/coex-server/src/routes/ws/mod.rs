//! Debug WebSocket.
//!
//! A client opens `/v2/components/{id}/debug`, sends a `debug` message to
//! run the component, and receives `progress` messages in place of
//! webhooks until the execution reaches a terminal status.
//!
//! - `protocol` - Message types (ClientMessage, ServerMessage)
//! - `connection` - Connection lifecycle

mod connection;
mod protocol;

use axum::{
    extract::{Path, State, ws::WebSocketUpgrade},
    response::Response,
};

use crate::state::AppState;

pub use protocol::{ClientMessage, ServerMessage};

/// GET /v2/components/{id}/debug - WebSocket upgrade handler.
pub async fn debug_ws_handler(
    ws: WebSocketUpgrade,
    Path(component_id): Path<i64>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| connection::handle_socket(socket, state, component_id))
}
