//! Hub configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Upper bound for the inbound queue.
pub const MAX_QUEUE_CAPACITY: usize = 65_536;

/// Upper bound for a single client frame (16 MiB).
pub const MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

/// Hub configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    /// Capacity of the queue between reader loops and the coordinator.
    /// Readers wait when it is full.
    #[serde(default = "default_inbound_queue_capacity")]
    pub inbound_queue_capacity: usize,

    /// Largest client frame accepted before the connection is dropped
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

impl HubConfig {
    /// Validate hub configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.inbound_queue_capacity == 0 || self.inbound_queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(ValidationError::InvalidQueueCapacity);
        }
        if self.max_message_bytes == 0 || self.max_message_bytes > MAX_MESSAGE_BYTES {
            return Err(ValidationError::InvalidMessageSize);
        }
        Ok(())
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            inbound_queue_capacity: default_inbound_queue_capacity(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

fn default_inbound_queue_capacity() -> usize {
    256
}

fn default_max_message_bytes() -> usize {
    64 * 1024
}
