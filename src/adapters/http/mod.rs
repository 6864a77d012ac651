//! HTTP adapters - the hub's HTTP surface.
//!
//! The only endpoint is the WebSocket upgrade; everything else is 404.

use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::application::Hub;
use crate::config::AppConfig;

use super::websocket::{websocket_router, WebSocketState};

/// Build the application router with request tracing.
pub fn app_router(hub: Hub, config: &AppConfig) -> Router {
    let state = WebSocketState::new(hub, &config.server, &config.hub);

    websocket_router(&config.server.ws_path)
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
