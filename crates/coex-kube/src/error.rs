//! Error types for the workload backend.

use thiserror::Error;

/// Result type alias using the backend error type.
pub type Result<T> = std::result::Result<T, KubeError>;

#[derive(Debug, Error)]
pub enum KubeError {
    /// Transport-level failure talking to the API server.
    #[error("Network error: {0}")]
    Network(String),

    /// The API server answered with a non-success status.
    #[error("Kubernetes API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The addressed object does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The object template could not be rendered.
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// The backend endpoint is not a usable URL.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl KubeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, KubeError::NotFound(_))
    }
}

impl From<reqwest::Error> for KubeError {
    fn from(err: reqwest::Error) -> Self {
        KubeError::Network(err.to_string())
    }
}
