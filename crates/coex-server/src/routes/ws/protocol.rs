//! Debug WebSocket protocol types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use coex_types::{Env, ExecuteComponentMsg, ExecutionStatus};

/// Messages from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start a debug run of the connection's component.
    Debug {
        /// Earlier debug execution to supersede; 0 for none.
        #[serde(default)]
        debug_seq_id: i64,
        kube_master: String,
        #[serde(default)]
        input: Value,
        #[serde(default)]
        envs: Vec<Env>,
    },
    /// Ping to keep connection alive.
    Ping,
}

/// Messages from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The debug run was accepted.
    Accepted {
        execute_seq_id: i64,
        status: ExecutionStatus,
    },
    /// A status change or event of the running debug execution.
    Progress { execution: Box<ExecuteComponentMsg> },
    /// Error occurred.
    Error { code: String, message: String },
    /// Pong response to ping.
    Pong,
}

impl ServerMessage {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn progress(execution: ExecuteComponentMsg) -> Self {
        Self::Progress {
            execution: Box::new(execution),
        }
    }
}
