//! Per-connection read loop.
//!
//! Each accepted connection gets one reader task. It decodes events off the
//! transport, stamps them with the originating connection and pushes them
//! into the shared inbound queue. On the first receive failure it closes
//! the connection and stops; it never fabricates a `leave` event, so the
//! coordinator only learns of a silent disconnect through a later failed
//! broadcast.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::hub::TransportError;
use crate::ports::{Connection, InboundStream};

use super::InboundEnvelope;

/// Why a reader loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderExit {
    /// The peer closed the transport or it failed at the I/O level.
    TransportClosed,
    /// The peer sent a frame that could not be decoded.
    DecodeFailed(TransportError),
    /// The coordinator is gone.
    QueueClosed,
    /// The loop panicked; the panic was contained here.
    Panicked(String),
}

/// Spawn the reader loop for one connection.
pub fn spawn_reader(
    connection: Arc<dyn Connection>,
    inbound: Box<dyn InboundStream>,
    queue: mpsc::Sender<InboundEnvelope>,
) -> JoinHandle<ReaderExit> {
    tokio::spawn(run_reader(connection, inbound, queue))
}

/// Run the reader loop for one connection to completion.
///
/// Panics raised while receiving or forwarding are caught here; the
/// connection is closed and the panic is reported as
/// [`ReaderExit::Panicked`].
pub async fn run_reader(
    connection: Arc<dyn Connection>,
    inbound: Box<dyn InboundStream>,
    queue: mpsc::Sender<InboundEnvelope>,
) -> ReaderExit {
    let id = connection.id();

    let exit = match AssertUnwindSafe(read_loop(connection.clone(), inbound, queue))
        .catch_unwind()
        .await
    {
        Ok(exit) => exit,
        Err(panic) => {
            let reason = panic_message(panic.as_ref());
            tracing::error!(connection_id = %id, "Reader loop panicked: {}", reason);
            ReaderExit::Panicked(reason)
        }
    };

    connection.close().await;
    tracing::debug!(connection_id = %id, exit = ?exit, "Reader loop stopped");
    exit
}

async fn read_loop(
    connection: Arc<dyn Connection>,
    mut inbound: Box<dyn InboundStream>,
    queue: mpsc::Sender<InboundEnvelope>,
) -> ReaderExit {
    let id = connection.id();

    loop {
        let event = match inbound.receive().await {
            Ok(event) => event,
            Err(TransportError::Closed) => {
                tracing::debug!(connection_id = %id, "Connection closed by peer");
                return ReaderExit::TransportClosed;
            }
            Err(TransportError::Io(e)) => {
                tracing::debug!(connection_id = %id, "Receive error: {}", e);
                return ReaderExit::TransportClosed;
            }
            Err(e) => {
                tracing::warn!(connection_id = %id, "Dropping connection: {}", e);
                return ReaderExit::DecodeFailed(e);
            }
        };

        tracing::trace!(connection_id = %id, action = ?event.action, "Received event");

        let envelope = InboundEnvelope {
            connection: connection.clone(),
            event,
        };
        if queue.send(envelope).await.is_err() {
            tracing::warn!(connection_id = %id, "Inbound queue closed, stopping reader");
            return ReaderExit::QueueClosed;
        }
    }
}

pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
