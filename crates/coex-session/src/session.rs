use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use coex_types::ExecuteComponentMsg;

/// Producing half of a debug session, owned by the registry.
#[derive(Debug)]
pub struct DebugSession {
    execution_id: i64,
    sender: mpsc::Sender<ExecuteComponentMsg>,
    cancel: CancellationToken,
    closed: AtomicBool,
}

impl DebugSession {
    pub(crate) fn channel(execution_id: i64, capacity: usize) -> (Self, DebugSubscription) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let cancel = CancellationToken::new();
        let session = Self {
            execution_id,
            sender,
            cancel: cancel.clone(),
            closed: AtomicBool::new(false),
        };
        let subscription = DebugSubscription {
            execution_id,
            receiver,
            cancel,
        };
        (session, subscription)
    }

    pub fn execution_id(&self) -> i64 {
        self.execution_id
    }

    pub(crate) fn try_send(
        &self,
        msg: ExecuteComponentMsg,
    ) -> std::result::Result<(), mpsc::error::TrySendError<ExecuteComponentMsg>> {
        self.sender.try_send(msg)
    }

    /// Close the session. Returns `true` only for the call that closed it.
    pub fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.cancel.cancel();
        true
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Consuming half of a debug session, held by the connected client.
#[derive(Debug)]
pub struct DebugSubscription {
    execution_id: i64,
    receiver: mpsc::Receiver<ExecuteComponentMsg>,
    cancel: CancellationToken,
}

impl DebugSubscription {
    pub fn execution_id(&self) -> i64 {
        self.execution_id
    }

    /// Next message, or `None` once the session is closed.
    ///
    /// Messages still queued when the session closes are discarded.
    pub async fn recv(&mut self) -> Option<ExecuteComponentMsg> {
        if self.cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            msg = self.receiver.recv() => msg,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves when the registry closes the session.
    pub async fn closed(&self) {
        self.cancel.cancelled().await
    }
}
