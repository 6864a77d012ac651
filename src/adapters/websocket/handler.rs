//! WebSocket upgrade handler for hub connections.
//!
//! Handles the HTTP → WebSocket upgrade and hands the socket to the hub:
//! 1. Check the `Origin` header against the configured allow-list
//! 2. Upgrade to WebSocket with the configured frame size limit
//! 3. Split the socket and let [`Hub::accept`] register it, send the
//!    private `connected` acknowledgement and spawn its reader loop

use std::sync::Arc;

use axum::{
    extract::{ws::WebSocket, State, WebSocketUpgrade},
    http::{header::ORIGIN, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::application::Hub;
use crate::config::{HubConfig, ServerConfig};

use super::connection::WebSocketConnection;

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    /// Hub that takes ownership of upgraded sockets.
    pub hub: Hub,
    /// Allowed `Origin` values; empty accepts every origin.
    pub allowed_origins: Arc<Vec<String>>,
    /// Largest accepted client frame, in bytes.
    pub max_message_bytes: usize,
}

impl WebSocketState {
    /// Create a new WebSocket state.
    pub fn new(hub: Hub, server: &ServerConfig, hub_config: &HubConfig) -> Self {
        Self {
            hub,
            allowed_origins: Arc::new(server.allowed_origins_list()),
            max_message_bytes: hub_config.max_message_bytes,
        }
    }

    /// Whether an upgrade carrying this `Origin` header may proceed.
    ///
    /// Requests without an `Origin` header come from non-browser clients
    /// and are always accepted.
    pub fn origin_allowed(&self, origin: Option<&str>) -> bool {
        match origin {
            _ if self.allowed_origins.is_empty() => true,
            None => true,
            Some(origin) => self.allowed_origins.iter().any(|allowed| allowed == origin),
        }
    }
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET <server.ws_path>` (default `/ws`)
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(state): State<WebSocketState>,
) -> Response {
    let origin = headers.get(ORIGIN).and_then(|v| v.to_str().ok());
    if !state.origin_allowed(origin) {
        tracing::warn!(origin = ?origin, "Rejected WebSocket upgrade from disallowed origin");
        return (StatusCode::FORBIDDEN, "Origin not allowed").into_response();
    }

    let hub = state.hub.clone();
    ws.max_message_size(state.max_message_bytes)
        .on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Hand an established WebSocket to the hub.
async fn handle_socket(socket: WebSocket, hub: Hub) {
    let (connection, inbound) = WebSocketConnection::split(socket);
    if let Err(e) = hub.accept(connection, Box::new(inbound)).await {
        tracing::debug!("Failed to accept WebSocket connection: {}", e);
    }
}

/// Create axum router for the WebSocket endpoint.
///
/// # Example
///
/// ```ignore
/// let app = websocket_router(&config.server.ws_path)
///     .with_state(WebSocketState::new(hub, &config.server, &config.hub));
/// ```
pub fn websocket_router(path: &str) -> Router<WebSocketState> {
    Router::new().route(path, get(ws_handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::registry::InMemoryConnectionRegistry;

    fn state(allowed: Option<&str>) -> WebSocketState {
        let (hub, _coordinator) = Hub::new(InMemoryConnectionRegistry::new_shared(), &HubConfig::default());
        let server = ServerConfig {
            allowed_origins: allowed.map(str::to_string),
            ..Default::default()
        };
        WebSocketState::new(hub, &server, &HubConfig::default())
    }

    #[test]
    fn any_origin_allowed_without_allow_list() {
        let state = state(None);
        assert!(state.origin_allowed(Some("http://evil.test")));
        assert!(state.origin_allowed(None));
    }

    #[test]
    fn allow_list_is_enforced() {
        let state = state(Some("http://chat.test, http://localhost:5173"));
        assert!(state.origin_allowed(Some("http://chat.test")));
        assert!(state.origin_allowed(Some("http://localhost:5173")));
        assert!(!state.origin_allowed(Some("http://evil.test")));
    }

    #[test]
    fn missing_origin_is_accepted_with_allow_list() {
        let state = state(Some("http://chat.test"));
        assert!(state.origin_allowed(None));
    }

    #[test]
    fn state_takes_frame_limit_from_hub_config() {
        let state = state(None);
        assert_eq!(state.max_message_bytes, HubConfig::default().max_message_bytes);
    }

    #[test]
    fn websocket_router_creates_route() {
        let _router = websocket_router("/ws");
        // Basic smoke test - router should create without panic
    }
}
