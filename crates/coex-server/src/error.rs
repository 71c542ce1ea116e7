//! HTTP error mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use coex_domain::DomainError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Duplicate or immutable component.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The execution is not in a status that allows the operation.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The Kubernetes API server could not be reached or refused.
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ServerError>;

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Conflict(_) | ServerError::InvalidState(_) => StatusCode::CONFLICT,
            ServerError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ServerError::Storage(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code for the response body.
    pub fn code(&self) -> &'static str {
        match self {
            ServerError::NotFound(_) => "not_found",
            ServerError::BadRequest(_) => "bad_request",
            ServerError::Conflict(_) => "conflict",
            ServerError::InvalidState(_) => "invalid_state",
            ServerError::BadGateway(_) => "bad_gateway",
            ServerError::Storage(_) => "storage_error",
            ServerError::Internal(_) => "internal_error",
        }
    }
}

impl From<DomainError> for ServerError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(msg) | DomainError::Unsupported(msg) => {
                ServerError::BadRequest(msg)
            }
            DomainError::NotFound(msg) => ServerError::NotFound(msg),
            DomainError::Precondition(msg) => ServerError::InvalidState(msg),
            DomainError::Conflict(msg) => ServerError::Conflict(msg),
            DomainError::Backend(e) => ServerError::BadGateway(e.to_string()),
            DomainError::Store(e) => ServerError::Storage(e.to_string()),
            DomainError::Notify(msg) | DomainError::Internal(msg) => ServerError::Internal(msg),
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = self.to_string();
        if status.is_server_error() {
            tracing::error!(%status, code, error = %message, "Request failed");
        } else {
            tracing::warn!(%status, code, error = %message, "Request rejected");
        }

        let body = ErrorResponse {
            code: code.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
