//! Fan-out of one outbound event to every registered connection.
//!
//! Delivery is attempted to each entry of a registry snapshot
//! independently. A connection whose send fails is closed and removed from
//! the registry on the spot, without going back through the inbound
//! queue. That makes dead connections self-healing, and it means the
//! registry has two removers (this and the coordinator's `leave`), both of
//! which rely on `remove` being idempotent.

use std::sync::Arc;

use futures::future::join_all;

use crate::domain::hub::{ConnectionId, OutboundEvent};
use crate::ports::{ConnectionRegistry, RegistryEntry};

/// Outcome of one broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Connections that accepted the event.
    pub delivered: usize,
    /// Connections evicted because their send failed.
    pub evicted: Vec<ConnectionId>,
}

/// Delivers outbound events to all registered connections.
#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<dyn ConnectionRegistry>,
}

impl Broadcaster {
    /// Create a broadcaster over the given registry.
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Send `event` to every connection registered at call time.
    ///
    /// Connections registered after the snapshot is taken do not receive
    /// this event.
    ///
    /// Sends carry no deadline: a peer whose writes stall holds up this call,
    /// and with it the coordinator, until its transport errors out.
    pub async fn broadcast(&self, event: &OutboundEvent) -> BroadcastReport {
        let snapshot = self.registry.snapshot().await;
        let recipients = snapshot.len();

        let outcomes = join_all(snapshot.iter().map(|entry| self.deliver(entry, event))).await;

        let mut report = BroadcastReport::default();
        for outcome in outcomes {
            match outcome {
                Ok(()) => report.delivered += 1,
                Err(id) => report.evicted.push(id),
            }
        }

        tracing::debug!(
            action = ?event.action,
            recipients,
            delivered = report.delivered,
            evicted = report.evicted.len(),
            "Broadcast event"
        );

        report
    }

    async fn deliver(&self, entry: &RegistryEntry, event: &OutboundEvent) -> Result<(), ConnectionId> {
        let id = entry.id();
        match entry.connection.send(event).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(
                    connection_id = %id,
                    label = %entry.label,
                    "Send failed, evicting connection: {}",
                    e
                );
                entry.connection.close().await;
                self.registry.remove(id).await;
                Err(id)
            }
        }
    }
}
