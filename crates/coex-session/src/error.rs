//! Error types for debug session delivery.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// No live session is registered for the execution.
    #[error("Debug session not found: {0}")]
    NotFound(i64),

    /// The consumer went away; the session has been evicted.
    #[error("Debug session closed: {0}")]
    Closed(i64),

    /// The consumer stopped draining its queue; the session has been evicted.
    #[error("Debug session overflowed: {0}")]
    Overflow(i64),
}

pub type Result<T> = std::result::Result<T, Error>;
