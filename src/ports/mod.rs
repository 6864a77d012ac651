//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the hub and the outside world. Adapters implement these ports.
//!
//! ## Transport Ports
//!
//! - `Connection` - Send/close half of one client transport
//! - `InboundStream` - Receive half, owned by that connection's reader loop
//!
//! ## State Ports
//!
//! - `ConnectionRegistry` - Live connections and their display labels

mod connection;
mod connection_registry;

pub use connection::{Connection, InboundStream};
pub use connection_registry::{ConnectionRegistry, RegistryEntry, RegistrySnapshot};
