//! In-process channel transport.
//!
//! Connects a hub connection to an in-process peer through tokio channels.
//! Inbound traffic travels as raw JSON frames, so the same codec path as
//! the WebSocket adapter is exercised; outbound traffic is handed to the
//! peer as structured [`OutboundEvent`]s.
//!
//! ```text
//!   ChannelPeer ──frames (String)──▶ ChannelInbound ──▶ reader loop
//!   ChannelPeer ◀──OutboundEvent─── ChannelConnection ◀── broadcaster
//! ```
//!
//! Dropping the peer's receiver makes every later send fail, which is how
//! tests simulate a client whose writes break mid-broadcast.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use crate::domain::hub::{ConnectionId, InboundEvent, OutboundEvent, TransportError};
use crate::ports::{Connection, InboundStream};

/// Create a connected transport triple.
///
/// # Arguments
///
/// * `capacity` - Buffer size of the peer → hub frame channel.
pub fn channel_connection(
    capacity: usize,
) -> (Arc<ChannelConnection>, ChannelInbound, ChannelPeer) {
    let (frame_tx, frame_rx) = mpsc::channel(capacity);
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (closed_tx, closed_rx) = watch::channel(false);
    let id = ConnectionId::new();

    let connection = Arc::new(ChannelConnection {
        id,
        outbound: event_tx,
        closed: closed_tx,
    });
    let inbound = ChannelInbound {
        frames: frame_rx,
        closed: closed_rx.clone(),
    };
    let peer = ChannelPeer {
        frames: frame_tx,
        events: event_rx,
        closed: closed_rx,
    };

    (connection, inbound, peer)
}

/// Hub side of a channel transport: send and close.
pub struct ChannelConnection {
    id: ConnectionId,
    outbound: mpsc::UnboundedSender<OutboundEvent>,
    closed: watch::Sender<bool>,
}

impl ChannelConnection {
    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

#[async_trait]
impl Connection for ChannelConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    async fn send(&self, event: &OutboundEvent) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        self.outbound
            .send(event.clone())
            .map_err(|_| TransportError::Closed)
    }

    async fn close(&self) {
        self.closed.send_replace(true);
    }
}

/// Hub side of a channel transport: receive.
pub struct ChannelInbound {
    frames: mpsc::Receiver<String>,
    closed: watch::Receiver<bool>,
}

#[async_trait]
impl InboundStream for ChannelInbound {
    async fn receive(&mut self) -> Result<InboundEvent, TransportError> {
        if *self.closed.borrow() {
            return Err(TransportError::Closed);
        }
        tokio::select! {
            frame = self.frames.recv() => match frame {
                Some(frame) => InboundEvent::decode(&frame),
                None => Err(TransportError::Closed),
            },
            _ = self.closed.wait_for(|closed| *closed) => Err(TransportError::Closed),
        }
    }
}

/// Remote (client) side of a channel transport.
pub struct ChannelPeer {
    frames: mpsc::Sender<String>,
    events: mpsc::UnboundedReceiver<OutboundEvent>,
    closed: watch::Receiver<bool>,
}

impl ChannelPeer {
    /// Encode and send an event to the hub.
    pub async fn send(&self, event: &InboundEvent) -> Result<(), TransportError> {
        let frame = serde_json::to_string(event).map_err(|e| TransportError::Encode(e.to_string()))?;
        self.send_raw(frame).await
    }

    /// Send a raw frame to the hub, bypassing the encoder.
    pub async fn send_raw(&self, frame: impl Into<String>) -> Result<(), TransportError> {
        self.frames
            .send(frame.into())
            .await
            .map_err(|_| TransportError::Closed)
    }

    /// Wait for the next event pushed by the hub.
    ///
    /// Returns `None` once the hub side has been dropped.
    pub async fn recv(&mut self) -> Option<OutboundEvent> {
        self.events.recv().await
    }

    /// Take the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<OutboundEvent> {
        self.events.try_recv().ok()
    }

    /// Drain every event currently queued.
    pub fn drain(&mut self) -> Vec<OutboundEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }

    /// Whether the hub has closed this connection.
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Wait until the hub closes this connection.
    pub async fn closed(&mut self) {
        let _ = self.closed.wait_for(|closed| *closed).await;
    }

    /// Stop accepting hub events; later sends to this connection fail.
    pub fn break_writes(&mut self) {
        self.events.close();
        while self.events.try_recv().is_ok() {}
    }
}
