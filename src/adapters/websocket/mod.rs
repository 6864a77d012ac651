//! WebSocket adapters for browser clients.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         ws_handler                                  │
//! │   - Checks Origin against the allow-list                            │
//! │   - Upgrades HTTP → WebSocket                                       │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ splits
//!                                     ▼
//! ┌──────────────────────────────┐   ┌──────────────────────────────────┐
//! │ WebSocketConnection          │   │ WebSocketInbound                 │
//! │  send / close (shared)       │   │  receive (owned by reader loop)  │
//! └──────────────────────────────┘   └──────────────────────────────────┘
//!                                     │
//!                                     │ Hub::accept
//!                                     ▼
//!                     registry + reader loop + coordinator
//! ```
//!
//! # Components
//!
//! - [`connection`] - `Connection`/`InboundStream` over an axum `WebSocket`
//! - [`handler`] - Axum WebSocket upgrade handler and router

pub mod connection;
pub mod handler;

pub use connection::{WebSocketConnection, WebSocketInbound};
pub use handler::{websocket_router, ws_handler, WebSocketState};
