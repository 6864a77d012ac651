//! WS Hub - Real-time WebSocket fan-out hub
//!
//! Browser clients hold persistent WebSocket connections, send structured
//! events, and the hub rebroadcasts derived events to every connected
//! client. A single coordinator task serializes every registry mutation and
//! broadcast decision; one reader task per connection feeds it.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
