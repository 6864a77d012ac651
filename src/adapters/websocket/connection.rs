//! axum `WebSocket` wrapped as a hub connection.
//!
//! The socket is split once at accept time:
//! - the sink goes into [`WebSocketConnection`] behind an async mutex, so
//!   the coordinator, the broadcaster and the accept path can all send
//! - the stream goes into [`WebSocketInbound`], owned by the reader loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::Mutex;

use crate::domain::hub::{ConnectionId, InboundEvent, OutboundEvent, TransportError};
use crate::ports::{Connection, InboundStream};

/// Send/close half of an upgraded WebSocket.
pub struct WebSocketConnection {
    id: ConnectionId,
    sink: Mutex<SplitSink<WebSocket, Message>>,
    closed: AtomicBool,
}

impl WebSocketConnection {
    /// Split an upgraded socket into the hub's two halves.
    pub fn split(socket: WebSocket) -> (Arc<Self>, WebSocketInbound) {
        let (sink, stream) = socket.split();
        let id = ConnectionId::new();
        let connection = Arc::new(Self {
            id,
            sink: Mutex::new(sink),
            closed: AtomicBool::new(false),
        });
        (connection, WebSocketInbound { id, stream })
    }

    /// Whether `close` has been called on this side.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl Connection for WebSocketConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    async fn send(&self, event: &OutboundEvent) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        let text = event.encode()?;
        self.sink
            .lock()
            .await
            .send(Message::Text(text))
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let mut sink = self.sink.lock().await;
        // Peer may already be gone; nothing useful to do with these errors.
        let _ = sink.send(Message::Close(None)).await;
        let _ = sink.close().await;
        tracing::debug!(connection_id = %self.id, "WebSocket closed");
    }
}

/// Receive half of an upgraded WebSocket.
pub struct WebSocketInbound {
    id: ConnectionId,
    stream: SplitStream<WebSocket>,
}

#[async_trait]
impl InboundStream for WebSocketInbound {
    async fn receive(&mut self) -> Result<InboundEvent, TransportError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return InboundEvent::decode(&text),
                Some(Ok(Message::Binary(bytes))) => return InboundEvent::decode_slice(&bytes),
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                    // Control frames are answered by axum
                    tracing::trace!(connection_id = %self.id, "Control frame");
                }
                Some(Ok(Message::Close(_))) | None => return Err(TransportError::Closed),
                Some(Err(e)) => return Err(TransportError::Io(e.to_string())),
            }
        }
    }
}
