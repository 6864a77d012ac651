//! Error types for the hub.
//!
//! Every failure here is local to a single connection. None of them is
//! allowed to reach the coordinator loop or the registry.

use thiserror::Error;

/// Failures of one transport (read, write, decode or close).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Connection closed")]
    Closed,

    #[error("Malformed frame: {0}")]
    Malformed(String),

    #[error("Failed to encode event: {0}")]
    Encode(String),

    #[error("Transport I/O error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Malformed(err.to_string())
    }
}

/// Errors surfaced by the hub facade.
#[derive(Debug, Error)]
pub enum HubError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Inbound queue is closed")]
    QueueClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_errors_map_to_malformed() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let transport: TransportError = err.into();
        assert!(matches!(transport, TransportError::Malformed(_)));
    }

    #[test]
    fn hub_error_wraps_transport_message() {
        let err = HubError::from(TransportError::Closed);
        assert_eq!(err.to_string(), "Connection closed");
    }
}
