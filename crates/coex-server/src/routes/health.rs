//! Liveness endpoint.

use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub debug_sessions: DebugSessionsHealth,
}

/// Occupancy of the debug session registry.
#[derive(Debug, Serialize, Deserialize)]
pub struct DebugSessionsHealth {
    pub live: usize,
    pub capacity: usize,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.orchestrator().sessions().stats().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        debug_sessions: DebugSessionsHealth {
            live: stats.live,
            capacity: stats.capacity,
        },
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use coex_domain::{DomainServices, OrchestratorConfig, RecordingWebhook};
    use coex_kube::{MockBackend, MockConnector};
    use coex_session::{DebugSessionRegistry, RegistryConfig};
    use coex_store::ExecutionStore;
    use tower::ServiceExt;

    use super::*;
    use crate::{Server, ServerConfig};

    fn test_router(max_sessions: usize) -> Router {
        let services = DomainServices::new(
            Arc::new(ExecutionStore::open_in_memory().unwrap()),
            Arc::new(MockConnector::new(Arc::new(MockBackend::new()))),
            Arc::new(RecordingWebhook::new()),
            DebugSessionRegistry::new(RegistryConfig::default().with_max_sessions(max_sessions)),
            OrchestratorConfig::default(),
        );
        Server::from_state(AppState::new(services, ServerConfig::new())).router()
    }

    #[tokio::test]
    async fn test_health_reports_registry_capacity() {
        let response = test_router(7)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.debug_sessions.live, 0);
        assert_eq!(health.debug_sessions.capacity, 7);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = test_router(1)
            .oneshot(Request::builder().uri("/v1/events").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
