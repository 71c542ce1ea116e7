//! API routes.

pub mod components;
pub mod events;
pub mod executions;
pub mod health;
pub mod ws;

pub use components::{
    ComponentRequest, CreatedResponse, ExecuteRequest, ListComponentsQuery,
    ListComponentsResponse, SaveVersionRequest, create_component_handler,
    delete_component_handler, execute_component_handler, get_component_handler,
    list_components_handler, save_version_handler, update_component_handler,
};
pub use events::{EventRequest, EventResponse, receive_event_handler};
pub use executions::{GetExecutionQuery, get_execution_handler, stop_execution_handler};
pub use health::health_routes;
pub use ws::{ClientMessage, ServerMessage, debug_ws_handler};
