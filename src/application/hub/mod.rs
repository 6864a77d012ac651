//! The fan-out hub: registry, reader loops, coordinator and broadcaster.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐  ┌──────────┐  ┌──────────┐
//! │ reader 1 │  │ reader 2 │  │ reader n │   one task per connection
//! └────┬─────┘  └────┬─────┘  └────┬─────┘
//!      └─────────────┼─────────────┘
//!                    ▼
//!         bounded inbound queue (mpsc)
//!                    │
//!                    ▼
//!             ┌─────────────┐
//!             │ Coordinator │   single consumer, serializes decisions
//!             └──────┬──────┘
//!                    ▼
//!             ┌─────────────┐
//!             │ Broadcaster │──▶ every registered connection
//!             └─────────────┘
//! ```
//!
//! # Components
//!
//! - [`reader`] - per-connection read loop with panic containment
//! - [`coordinator`] - the join/message/leave state machine
//! - [`broadcaster`] - fan-out with inline eviction of failed connections

pub mod broadcaster;
pub mod coordinator;
pub mod reader;

pub use broadcaster::{BroadcastReport, Broadcaster};
pub use coordinator::{Coordinator, Dispatch};
pub use reader::{run_reader, spawn_reader, ReaderExit};

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::HubConfig;
use crate::domain::hub::{HubError, InboundEvent, OutboundEvent};
use crate::ports::{Connection, ConnectionRegistry, InboundStream};

/// An inbound event stamped with the connection it arrived on.
pub struct InboundEnvelope {
    pub connection: Arc<dyn Connection>,
    pub event: InboundEvent,
}

impl fmt::Debug for InboundEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboundEnvelope")
            .field("connection", &self.connection.id())
            .field("event", &self.event)
            .finish()
    }
}

/// Cloneable entry point into a running hub.
///
/// Holds the registry and the sending side of the inbound queue. The
/// coordinator stops once every `Hub` clone and every reader loop has been
/// dropped.
#[derive(Clone)]
pub struct Hub {
    registry: Arc<dyn ConnectionRegistry>,
    queue: mpsc::Sender<InboundEnvelope>,
}

impl Hub {
    /// Create a hub and its (not yet running) coordinator.
    pub fn new(registry: Arc<dyn ConnectionRegistry>, config: &HubConfig) -> (Self, Coordinator) {
        let (queue, inbound) = mpsc::channel(config.inbound_queue_capacity);
        let coordinator = Coordinator::new(registry.clone(), inbound);
        (Self { registry, queue }, coordinator)
    }

    /// Create a hub and spawn its coordinator onto the runtime.
    pub fn start(registry: Arc<dyn ConnectionRegistry>, config: &HubConfig) -> (Self, JoinHandle<()>) {
        let (hub, coordinator) = Self::new(registry, config);
        let handle = tokio::spawn(coordinator.run());
        (hub, handle)
    }

    /// The registry this hub mutates.
    pub fn registry(&self) -> &Arc<dyn ConnectionRegistry> {
        &self.registry
    }

    /// Take ownership of a freshly upgraded connection.
    ///
    /// 1. Register it with an empty label
    /// 2. Unicast the `connected` acknowledgement to it alone
    /// 3. Spawn its reader loop
    ///
    /// If the acknowledgement cannot be delivered the connection is closed
    /// and unregistered again, and no reader is spawned.
    pub async fn accept(
        &self,
        connection: Arc<dyn Connection>,
        inbound: Box<dyn InboundStream>,
    ) -> Result<JoinHandle<ReaderExit>, HubError> {
        let id = connection.id();

        if self.queue.is_closed() {
            connection.close().await;
            return Err(HubError::QueueClosed);
        }

        self.registry.add(connection.clone()).await;

        if let Err(e) = connection.send(&OutboundEvent::connected()).await {
            tracing::debug!(connection_id = %id, "Failed to send connected message: {}", e);
            connection.close().await;
            self.registry.remove(id).await;
            return Err(e.into());
        }

        tracing::info!(connection_id = %id, "Client connected");
        Ok(spawn_reader(connection, inbound, self.queue.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::channel_connection;
    use crate::adapters::registry::InMemoryConnectionRegistry;
    use crate::domain::hub::{OutboundAction, TransportError, CONNECTED_MESSAGE};

    #[tokio::test]
    async fn accept_registers_and_acknowledges() {
        let registry = InMemoryConnectionRegistry::new_shared();
        let (hub, _coordinator) = Hub::new(registry.clone(), &HubConfig::default());
        let (conn, inbound, mut peer) = channel_connection(4);

        let _reader = hub.accept(conn.clone(), Box::new(inbound)).await.unwrap();

        assert_eq!(registry.label(conn.id()).await.as_deref(), Some(""));
        let ack = peer.recv().await.unwrap();
        assert_eq!(ack.action, OutboundAction::Connected);
        assert_eq!(ack.message, CONNECTED_MESSAGE);
    }

    #[tokio::test]
    async fn accept_rolls_back_when_ack_fails() {
        let registry = InMemoryConnectionRegistry::new_shared();
        let (hub, _coordinator) = Hub::new(registry.clone(), &HubConfig::default());
        let (conn, inbound, mut peer) = channel_connection(4);
        peer.break_writes();

        let result = hub.accept(conn.clone(), Box::new(inbound)).await;

        assert!(matches!(result, Err(HubError::Transport(TransportError::Closed))));
        assert!(registry.is_empty().await);
        assert!(conn.is_closed());
    }

    #[tokio::test]
    async fn accept_fails_when_coordinator_is_gone() {
        let registry = InMemoryConnectionRegistry::new_shared();
        let (hub, coordinator) = Hub::new(registry.clone(), &HubConfig::default());
        drop(coordinator);
        let (conn, inbound, _peer) = channel_connection(4);

        let result = hub.accept(conn.clone(), Box::new(inbound)).await;

        assert!(matches!(result, Err(HubError::QueueClosed)));
        assert!(registry.is_empty().await);
    }

    #[test]
    fn envelope_debug_shows_connection_id() {
        let (conn, _inbound, _peer) = channel_connection(1);
        let envelope = InboundEnvelope {
            connection: conn.clone(),
            event: InboundEvent::leave(),
        };
        assert!(format!("{:?}", envelope).contains(&conn.id().to_string()));
    }
}
