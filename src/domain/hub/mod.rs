//! Hub module - vocabulary of the fan-out hub.
//!
//! Contains the connection identifier, the client/hub event types and the
//! error types shared by the ports, adapters and coordinator.

mod errors;
mod events;
mod ids;

pub use errors::{HubError, TransportError};
pub use events::{
    InboundAction, InboundEvent, OutboundAction, OutboundEvent, CONNECTED_MESSAGE,
};
pub use ids::ConnectionId;
