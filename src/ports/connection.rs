//! Connection port - Interface for one bidirectional client transport.
//!
//! A transport is split in two halves:
//!
//! - [`Connection`] - the shareable half (`Arc<dyn Connection>`) used to
//!   send events and to close the transport. Held by the registry and by
//!   anyone who needs to push to the client.
//! - [`InboundStream`] - the receive half, owned exclusively by the one
//!   reader loop of that connection.

use async_trait::async_trait;

use crate::domain::hub::{ConnectionId, InboundEvent, OutboundEvent, TransportError};

/// Send/close half of a client transport.
///
/// # Example
///
/// ```ignore
/// async fn greet(conn: Arc<dyn Connection>) {
///     if conn.send(&OutboundEvent::connected()).await.is_err() {
///         conn.close().await;
///     }
/// }
/// ```
#[async_trait]
pub trait Connection: Send + Sync {
    /// Identity of the underlying transport.
    fn id(&self) -> ConnectionId;

    /// Encode and deliver one event to the client.
    ///
    /// Fails with [`TransportError::Closed`] once the connection has been
    /// closed from either side.
    async fn send(&self, event: &OutboundEvent) -> Result<(), TransportError>;

    /// Close the transport.
    ///
    /// Idempotent: closing an already closed connection is a no-op.
    async fn close(&self);
}

/// Receive half of a client transport.
#[async_trait]
pub trait InboundStream: Send {
    /// Wait for and decode the next event from the client.
    ///
    /// Any error is terminal for the stream: the reader loop closes the
    /// connection and stops.
    async fn receive(&mut self) -> Result<InboundEvent, TransportError>;
}
