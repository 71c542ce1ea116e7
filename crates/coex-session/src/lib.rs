//! Debug session registry.
//!
//! An interactive client running a component in debug mode receives its
//! lifecycle notifications through a [`DebugSubscription`] instead of
//! webhooks. The [`DebugSessionRegistry`] maps execution ids to the
//! producing half of those sessions with:
//! - LRU eviction bounded by `max_sessions`
//! - close-exactly-once semantics for every evicted session
//! - non-blocking sends; a consumer that falls behind is evicted
//!
//! # Example
//!
//! ```rust,ignore
//! use coex_session::{DebugSessionRegistry, RegistryConfig};
//!
//! let registry = DebugSessionRegistry::new(RegistryConfig::default());
//! let mut subscription = registry.open(execution_id).await;
//! while let Some(msg) = subscription.recv().await {
//!     // forward to the client
//! }
//! ```

mod config;
mod error;
mod registry;
mod session;

pub use config::RegistryConfig;
pub use error::{Error, Result};
pub use registry::{DebugSessionRegistry, EvictionCallback, EvictionReason, RegistryStats};
pub use session::{DebugSession, DebugSubscription};
