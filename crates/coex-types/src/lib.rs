//! Shared types for the coex component execution service.
//!
//! Everything that crosses a crate boundary (status values, event kinds,
//! the webhook / debug payload) lives here so the store, the orchestrator
//! and the HTTP layer agree on one wire format.

pub mod error;
pub mod message;
pub mod status;

pub use error::ParseError;
pub use message::{Env, EventMsg, ExecuteComponentMsg, KubeObjects, NotifyUrls};
pub use status::{ComponentKind, EventType, ExecutionStatus};

/// Timestamp layout used for execution detail lines.
pub const DETAIL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Environment variable carrying the execution id into the workload.
pub const ENV_EXECUTE_SEQ_ID: &str = "CO_EXECUTE_SEQ_ID";
/// Environment variable carrying the configured timeout in seconds.
pub const ENV_EXECUTE_TIMEOUT: &str = "CO_EXECUTE_TIMEOUT";
/// Environment variable carrying the resolved input document.
pub const ENV_INPUT: &str = "CO_INPUT";
/// Environment variable carrying the callback URL for lifecycle events.
pub const ENV_EVENT_URL: &str = "CO_EVENT_URL";
