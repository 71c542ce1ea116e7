//! HTTP API and debug WebSocket server for coex.
//!
//! # Routes
//!
//! - `GET /health`
//! - `POST /v2/events` - lifecycle callbacks from workloads
//! - `/v2/components[/{id}]` - component catalog
//! - `POST /v2/components/{id}/execute` - start an execution
//! - `GET /v2/components/{id}/debug` - debug run over WebSocket
//! - `GET|DELETE /v2/executions/{id}` - inspect or stop an execution
//!
//! # Example
//!
//! ```ignore
//! use coex_server::{AppState, Server, ServerConfig};
//!
//! let state = AppState::new(services, ServerConfig::new());
//! Server::from_state(state).run().await?;
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{ErrorResponse, Result, ServerError};
pub use state::AppState;

use std::net::SocketAddr;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// The coex HTTP/WebSocket server.
pub struct Server {
    state: AppState,
}

impl Server {
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let router = Router::new()
            .merge(routes::health_routes())
            .nest("/v2", self.api_routes())
            .layer(DefaultBodyLimit::max(self.state.config().max_body_size));

        let router = if self.state.config().request_logging {
            router.layer(TraceLayer::new_for_http())
        } else {
            router
        };
        router.with_state(self.state.clone())
    }

    fn api_routes(&self) -> Router<AppState> {
        use axum::routing::{get, post};

        Router::new()
            .route("/events", post(routes::receive_event_handler))
            .route(
                "/components",
                get(routes::list_components_handler).post(routes::create_component_handler),
            )
            .route(
                "/components/{id}",
                get(routes::get_component_handler)
                    .put(routes::update_component_handler)
                    .post(routes::save_version_handler)
                    .delete(routes::delete_component_handler),
            )
            .route(
                "/components/{id}/execute",
                post(routes::execute_component_handler),
            )
            .route("/components/{id}/debug", get(routes::debug_ws_handler))
            .route(
                "/executions/{id}",
                get(routes::get_execution_handler).delete(routes::stop_execution_handler),
            )
    }

    /// Run the server on the configured address.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config().bind_address;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind {addr}: {e}")))?;
        self.serve(listener).await
    }

    /// Run the server on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let router = self.router();
        if let Ok(addr) = listener.local_addr() {
            info!("Starting server on {}", addr);
        }
        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {e}")))
    }

    pub fn bind_address(&self) -> SocketAddr {
        self.state.config().bind_address
    }
}
