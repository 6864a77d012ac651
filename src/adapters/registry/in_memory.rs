//! In-process connection registry.
//!
//! A single mutex-guarded map from connection id to (handle, label). Each
//! trait method takes the lock for exactly one map access and releases it
//! before returning, so the lock is never held across a send.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::hub::ConnectionId;
use crate::ports::{Connection, ConnectionRegistry, RegistryEntry, RegistrySnapshot};

/// Registry of the connections served by this process.
///
/// # Thread Safety
///
/// Uses a `Mutex` rather than an `RwLock`: snapshots are taken once per
/// broadcast and copy the map, so reads are short and do not benefit from
/// shared access.
pub struct InMemoryConnectionRegistry {
    entries: Mutex<HashMap<ConnectionId, RegistryEntry>>,
}

impl InMemoryConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Create as an Arc (for sharing between the hub, coordinator and
    /// broadcaster).
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for InMemoryConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn add(&self, connection: Arc<dyn Connection>) {
        let id = connection.id();
        self.entries
            .lock()
            .await
            .entry(id)
            .or_insert_with(|| RegistryEntry {
                connection,
                label: String::new(),
            });
    }

    async fn set_label(&self, connection: Arc<dyn Connection>, label: String) {
        let id = connection.id();
        self.entries
            .lock()
            .await
            .insert(id, RegistryEntry { connection, label });
    }

    async fn remove(&self, id: ConnectionId) -> bool {
        self.entries.lock().await.remove(&id).is_some()
    }

    async fn label(&self, id: ConnectionId) -> Option<String> {
        self.entries.lock().await.get(&id).map(|e| e.label.clone())
    }

    async fn snapshot(&self) -> RegistrySnapshot {
        let entries = self.entries.lock().await.values().cloned().collect();
        RegistrySnapshot::new(entries)
    }

    async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
