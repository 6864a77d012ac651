//! Application layer - Orchestrates the hub's moving parts.
//!
//! - `hub` - Reader loops, the coordinator and the broadcaster

pub mod hub;

pub use hub::{Hub, InboundEnvelope};
