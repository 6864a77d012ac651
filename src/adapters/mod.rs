//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the hub to external systems:
//! - `http` - Application router and request tracing
//! - `websocket` - axum WebSocket transport and upgrade handler
//! - `memory` - In-process channel transport (embedding, tests)
//! - `registry` - In-memory connection registry

pub mod http;
pub mod memory;
pub mod registry;
pub mod websocket;

pub use http::app_router;
pub use memory::{channel_connection, ChannelConnection, ChannelInbound, ChannelPeer};
pub use registry::InMemoryConnectionRegistry;
pub use websocket::{WebSocketConnection, WebSocketInbound, WebSocketState};
