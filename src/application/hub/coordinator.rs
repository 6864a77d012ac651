//! The coordinator: single consumer of the inbound queue.
//!
//! Because exactly one task drains the queue, every join/leave decision
//! and every broadcast is serialized here without locking the decision
//! logic itself. Broadcast order is dequeue order.
//!
//! # Transitions
//!
//! | Inbound action | Registry            | Broadcast                          |
//! |----------------|---------------------|------------------------------------|
//! | `user`         | set label           | none                               |
//! | `message`      | unchanged           | `message` (no roster)              |
//! | `left`         | remove + close      | `user_left` with the sorted roster |
//! | anything else  | unchanged           | none (logged and dropped)          |
//!
//! The roster is only pushed on `left`. Joins are acknowledged privately at
//! accept time and do not trigger a roster broadcast.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;

use crate::domain::hub::{InboundAction, OutboundEvent};
use crate::ports::ConnectionRegistry;

use super::broadcaster::{BroadcastReport, Broadcaster};
use super::reader::panic_message;
use super::InboundEnvelope;

/// What the coordinator did with one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The connection was (re)labelled.
    Joined,
    /// A chat message was broadcast.
    Broadcast(BroadcastReport),
    /// The connection was removed and the new roster broadcast.
    Left(BroadcastReport),
    /// The action was not recognized; nothing happened.
    Ignored,
}

/// Owns the receiving end of the inbound queue.
pub struct Coordinator {
    registry: Arc<dyn ConnectionRegistry>,
    broadcaster: Broadcaster,
    inbound: mpsc::Receiver<InboundEnvelope>,
}

impl Coordinator {
    /// Create a coordinator draining `inbound`.
    pub fn new(registry: Arc<dyn ConnectionRegistry>, inbound: mpsc::Receiver<InboundEnvelope>) -> Self {
        Self {
            broadcaster: Broadcaster::new(registry.clone()),
            registry,
            inbound,
        }
    }

    /// Process events until every queue sender has been dropped.
    ///
    /// A panic while handling one event is logged and the loop moves on to
    /// the next; nothing short of the queue closing ends this loop.
    pub async fn run(mut self) {
        tracing::info!("Coordinator started");

        while let Some(envelope) = self.inbound.recv().await {
            let id = envelope.connection.id();
            let action = envelope.event.action;

            if let Err(panic) = AssertUnwindSafe(self.dispatch(envelope)).catch_unwind().await {
                tracing::error!(
                    connection_id = %id,
                    action = ?action,
                    "Event handling panicked: {}",
                    panic_message(panic.as_ref())
                );
            }
        }

        tracing::info!("Inbound queue closed, coordinator stopped");
    }

    /// Apply one inbound event.
    ///
    /// Exposed so tests can drive the state machine without the queue.
    pub async fn dispatch(&self, envelope: InboundEnvelope) -> Dispatch {
        let InboundEnvelope { connection, event } = envelope;
        let id = connection.id();

        match event.action {
            InboundAction::Join => {
                tracing::debug!(connection_id = %id, username = %event.username, "User joined");
                self.registry.set_label(connection, event.username).await;
                Dispatch::Joined
            }
            InboundAction::Message => {
                let outbound = OutboundEvent::chat_message(&event);
                Dispatch::Broadcast(self.broadcaster.broadcast(&outbound).await)
            }
            InboundAction::Leave => {
                let removed = self.registry.remove(id).await;
                connection.close().await;

                let roster = self.registry.snapshot().await.roster();
                tracing::info!(
                    connection_id = %id,
                    was_registered = removed,
                    remaining = roster.len(),
                    "User left"
                );

                let outbound = OutboundEvent::user_left(&event, roster);
                Dispatch::Left(self.broadcaster.broadcast(&outbound).await)
            }
            InboundAction::Unknown => {
                tracing::debug!(connection_id = %id, "Ignoring event with unrecognized action");
                Dispatch::Ignored
            }
        }
    }
}
