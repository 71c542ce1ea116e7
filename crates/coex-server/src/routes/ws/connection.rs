//! Debug WebSocket connection lifecycle.

use axum::extract::ws::{CloseFrame, Message, WebSocket, close_code};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use coex_domain::StartRequest;
use coex_session::DebugSubscription;
use coex_types::{Env, ExecuteComponentMsg};

use super::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;

type Sender = SplitSink<WebSocket, Message>;

/// Per-connection state.
struct DebugConnection {
    component_id: i64,
    /// Most recent debug execution started by this connection.
    execution_id: Option<i64>,
    subscription: Option<DebugSubscription>,
}

impl DebugConnection {
    fn new(component_id: i64) -> Self {
        Self {
            component_id,
            execution_id: None,
            subscription: None,
        }
    }
}

/// Handle a debug WebSocket connection for `component_id`.
pub async fn handle_socket(socket: WebSocket, state: AppState, component_id: i64) {
    let (mut sender, mut receiver) = socket.split();
    let mut conn = DebugConnection::new(component_id);
    let idle_timeout = state.orchestrator().sessions().config().idle_timeout;
    let mut deadline = Instant::now() + idle_timeout;

    debug!(component_id, "Debug connection established");

    loop {
        tokio::select! {
            _ = sleep_until(deadline) => {
                info!(component_id, "Debug connection closed due to idle timeout");
                let _ = send_close(&mut sender, "idle timeout").await;
                break;
            }
            progress = next_progress(&mut conn.subscription) => {
                let Some(execution) = progress else {
                    debug!(component_id, execution_id = ?conn.execution_id, "Debug session closed by registry");
                    let _ = send_message(
                        &mut sender,
                        ServerMessage::error("session_closed", "Debug session was superseded or evicted"),
                    )
                    .await;
                    let _ = send_close(&mut sender, "session closed").await;
                    break;
                };
                deadline = Instant::now() + idle_timeout;
                let terminal = execution.status.is_terminal();
                if send_message(&mut sender, ServerMessage::progress(execution)).await.is_err() {
                    break;
                }
                if terminal {
                    let _ = send_close(&mut sender, "execution finished").await;
                    break;
                }
            }
            incoming = receiver.next() => {
                deadline = Instant::now() + idle_timeout;
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text.to_string(),
                    Some(Ok(Message::Binary(data))) => match String::from_utf8(data.to_vec()) {
                        Ok(text) => text,
                        Err(_) => {
                            let _ = send_message(
                                &mut sender,
                                ServerMessage::error("invalid_message", "Binary data must be UTF-8"),
                            )
                            .await;
                            continue;
                        }
                    },
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                        continue;
                    }
                    Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!(component_id, error = %e, "WebSocket error");
                        break;
                    }
                };

                let reply = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Ping) => ServerMessage::Pong,
                    Ok(ClientMessage::Debug {
                        debug_seq_id,
                        kube_master,
                        input,
                        envs,
                    }) => start_debug(&state, &mut conn, debug_seq_id, kube_master, input, envs).await,
                    Err(e) => ServerMessage::error("parse_error", format!("Invalid message: {e}")),
                };
                if send_message(&mut sender, reply).await.is_err() {
                    break;
                }
            }
        }
    }

    if let Some(id) = conn.execution_id
        && state.orchestrator().sessions().invalidate(id).await
    {
        debug!(execution_id = id, "Released debug session on disconnect");
    }
    debug!(component_id, "Debug connection closed");
}

async fn start_debug(
    state: &AppState,
    conn: &mut DebugConnection,
    debug_seq_id: i64,
    kube_master: String,
    input: Value,
    envs: Vec<Env>,
) -> ServerMessage {
    let prior = Some(debug_seq_id)
        .filter(|id| *id > 0)
        .or(conn.execution_id);
    let request = StartRequest {
        component_id: conn.component_id,
        executor_name: String::new(),
        backend_endpoint: kube_master,
        input,
        envs,
        notify_urls: Default::default(),
        debug: true,
        debug_prior_execution: prior,
    };
    match state.orchestrator().start_component(request).await {
        Ok(outcome) => {
            let id = outcome.context.id();
            conn.execution_id = Some(id);
            conn.subscription = outcome.debug;
            info!(component_id = conn.component_id, execution_id = id, "Debug run accepted");
            ServerMessage::Accepted {
                execute_seq_id: id,
                status: outcome.context.status(),
            }
        }
        Err(e) => ServerMessage::error("start_failed", e.to_string()),
    }
}

/// Next message on the current subscription; pending forever without one.
async fn next_progress(subscription: &mut Option<DebugSubscription>) -> Option<ExecuteComponentMsg> {
    match subscription {
        Some(sub) => sub.recv().await,
        None => std::future::pending().await,
    }
}

async fn send_message(sender: &mut Sender, msg: ServerMessage) -> Result<(), axum::Error> {
    let json = serde_json::to_string(&msg).map_err(axum::Error::new)?;
    sender.send(Message::Text(json.into())).await
}

async fn send_close(sender: &mut Sender, reason: &'static str) -> Result<(), axum::Error> {
    sender
        .send(Message::Close(Some(CloseFrame {
            code: close_code::NORMAL,
            reason: reason.into(),
        })))
        .await
}
