//! Domain layer containing the hub's types.
//!
//! # Module Organization
//!
//! - `hub` - Connection identity, client/hub events and error types

pub mod hub;
