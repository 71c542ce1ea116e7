//! Domain error types.

use thiserror::Error;

use coex_kube::KubeError;
use coex_store::StoreError;

/// Domain-level errors.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed identifier or missing required field. Nothing was mutated.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The referenced component or execution does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The current status does not permit the requested transition.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// The request collides with existing state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The component targets a backend that cannot run it.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Workload backend failure outside the recorded lifecycle.
    #[error("Backend error: {0}")]
    Backend(#[from] KubeError),

    /// Storage failure.
    #[error("Storage error: {0}")]
    Store(StoreError),

    /// Webhook delivery failure.
    #[error("Notification error: {0}")]
    Notify(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => DomainError::NotFound(what),
            StoreError::Conflict(what) => DomainError::Conflict(what),
            other => DomainError::Store(other),
        }
    }
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;
