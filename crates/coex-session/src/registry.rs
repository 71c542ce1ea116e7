//! LRU registry of live debug sessions.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::RwLock;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, trace, warn};

use coex_types::ExecuteComponentMsg;

use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::session::{DebugSession, DebugSubscription};

/// Why a session left the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
    /// Least recently used entry dropped to make room.
    Capacity,
    /// Explicitly invalidated.
    Invalidated,
    /// A new session was opened under the same execution id.
    Replaced,
    /// The consumer stopped draining its queue.
    Overflow,
    /// The consumer dropped its subscription.
    Disconnected,
}

impl fmt::Display for EvictionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EvictionReason::Capacity => "capacity",
            EvictionReason::Invalidated => "invalidated",
            EvictionReason::Replaced => "replaced",
            EvictionReason::Overflow => "overflow",
            EvictionReason::Disconnected => "disconnected",
        };
        f.write_str(s)
    }
}

/// Invoked once per closed session, while the registry lock is held.
/// Must not call back into the registry.
pub type EvictionCallback = Arc<dyn Fn(i64, EvictionReason) + Send + Sync>;

struct RegistryInner {
    lru: LruCache<i64, Arc<DebugSession>>,
    opened: u64,
    evicted: u64,
}

/// Bounded map from execution id to its live debug session.
///
/// Constructed once and shared by cloning; clones see the same sessions.
pub struct DebugSessionRegistry {
    inner: Arc<RwLock<RegistryInner>>,
    config: RegistryConfig,
    on_evict: Option<EvictionCallback>,
}

impl DebugSessionRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        let cap = NonZeroUsize::new(config.max_sessions).unwrap_or(NonZeroUsize::MIN);
        let inner = RegistryInner {
            lru: LruCache::new(cap),
            opened: 0,
            evicted: 0,
        };
        Self {
            inner: Arc::new(RwLock::new(inner)),
            config,
            on_evict: None,
        }
    }

    /// Register a callback run for every evicted session.
    pub fn with_eviction_callback(
        mut self,
        callback: impl Fn(i64, EvictionReason) + Send + Sync + 'static,
    ) -> Self {
        self.on_evict = Some(Arc::new(callback));
        self
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Install a fresh session for `execution_id` and return its consumer.
    ///
    /// An existing session under the same id is closed first. At capacity,
    /// the least recently used session is closed to make room.
    pub async fn open(&self, execution_id: i64) -> DebugSubscription {
        let mut inner = self.inner.write().await;

        if let Some(previous) = inner.lru.pop(&execution_id) {
            self.evict(&mut inner, &previous, EvictionReason::Replaced);
        }
        if inner.lru.len() >= inner.lru.cap().get() {
            if let Some((_, lru)) = inner.lru.pop_lru() {
                self.evict(&mut inner, &lru, EvictionReason::Capacity);
            }
        }

        let (session, subscription) =
            DebugSession::channel(execution_id, self.config.channel_capacity);
        inner.lru.put(execution_id, Arc::new(session));
        inner.opened += 1;

        debug!(
            execution_id,
            live = inner.lru.len(),
            "Debug session opened"
        );
        subscription
    }

    /// Queue `msg` for the session of `execution_id` without waiting.
    ///
    /// A full queue or a departed consumer evicts the session.
    pub async fn send(&self, execution_id: i64, msg: ExecuteComponentMsg) -> Result<()> {
        let mut inner = self.inner.write().await;
        let Some(session) = inner.lru.get(&execution_id).cloned() else {
            return Err(Error::NotFound(execution_id));
        };

        match session.try_send(msg) {
            Ok(()) => {
                trace!(execution_id, "Debug message queued");
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                warn!(execution_id, "Debug consumer stalled, evicting session");
                inner.lru.pop(&execution_id);
                self.evict(&mut inner, &session, EvictionReason::Overflow);
                Err(Error::Overflow(execution_id))
            }
            Err(TrySendError::Closed(_)) => {
                inner.lru.pop(&execution_id);
                self.evict(&mut inner, &session, EvictionReason::Disconnected);
                Err(Error::Closed(execution_id))
            }
        }
    }

    /// Remove and close the session of `execution_id`, if any.
    pub async fn invalidate(&self, execution_id: i64) -> bool {
        let mut inner = self.inner.write().await;
        match inner.lru.pop(&execution_id) {
            Some(session) => {
                self.evict(&mut inner, &session, EvictionReason::Invalidated);
                true
            }
            None => false,
        }
    }

    pub async fn contains(&self, execution_id: i64) -> bool {
        self.inner.read().await.lru.contains(&execution_id)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.lru.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.lru.is_empty()
    }

    pub async fn stats(&self) -> RegistryStats {
        let inner = self.inner.read().await;
        RegistryStats {
            live: inner.lru.len(),
            capacity: inner.lru.cap().get(),
            opened: inner.opened,
            evicted: inner.evicted,
        }
    }

    fn evict(&self, inner: &mut RegistryInner, session: &DebugSession, reason: EvictionReason) {
        if !session.close() {
            return;
        }
        inner.evicted += 1;
        debug!(execution_id = session.execution_id(), %reason, "Debug session closed");
        if let Some(callback) = &self.on_evict {
            callback(session.execution_id(), reason);
        }
    }
}

impl Clone for DebugSessionRegistry {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            config: self.config.clone(),
            on_evict: self.on_evict.clone(),
        }
    }
}

/// Registry statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    /// Sessions currently registered.
    pub live: usize,
    pub capacity: usize,
    /// Sessions opened since construction.
    pub opened: u64,
    /// Sessions closed by eviction since construction.
    pub evicted: u64,
}
