//! ConnectionRegistry port - Interface for the set of live connections.
//!
//! The registry maps each live connection to its display label (possibly
//! empty). It is injected into the coordinator and the broadcaster rather
//! than held as ambient state, so tests can substitute their own.
//!
//! ## Locking Discipline
//!
//! Implementations must make every operation mutually exclusive with every
//! other at the granularity of a single map access, and must never hold
//! their lock across a send. Connections may therefore join or leave while
//! an older snapshot is still being broadcast to.
//!
//! ## Writers
//!
//! 1. The hub adds a connection (empty label) when it is accepted
//! 2. The coordinator relabels it on `join` and removes it on `leave`
//! 3. The broadcaster removes it when a delivery fails
//!
//! Paths 2 and 3 may race; `remove` is idempotent so both are safe.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::hub::ConnectionId;

use super::Connection;

/// Port for tracking the live connections of this hub.
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Register a connection with an empty label.
    ///
    /// Idempotent: an existing entry keeps its label.
    async fn add(&self, connection: Arc<dyn Connection>);

    /// Register a connection with the given label, overwriting any
    /// previous label (last write wins).
    async fn set_label(&self, connection: Arc<dyn Connection>, label: String);

    /// Remove a connection.
    ///
    /// Returns `true` if an entry was removed. Absence is not an error.
    async fn remove(&self, id: ConnectionId) -> bool;

    /// Look up the label of one connection.
    async fn label(&self, id: ConnectionId) -> Option<String>;

    /// Copy of the registry contents at call time.
    async fn snapshot(&self) -> RegistrySnapshot;

    /// Number of registered connections.
    async fn len(&self) -> usize;

    /// Whether no connection is registered.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// One registry entry as seen by a snapshot.
#[derive(Clone)]
pub struct RegistryEntry {
    pub connection: Arc<dyn Connection>,
    pub label: String,
}

impl RegistryEntry {
    /// Identity of the entry's connection.
    pub fn id(&self) -> ConnectionId {
        self.connection.id()
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("id", &self.id())
            .field("label", &self.label)
            .finish()
    }
}

/// Point-in-time copy of the registry.
///
/// Finite and restartable: [`RegistrySnapshot::iter`] can be called any
/// number of times and always yields the same entries. Later registry
/// changes are not reflected.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    entries: Vec<RegistryEntry>,
}

impl RegistrySnapshot {
    /// Build a snapshot from already-copied entries.
    pub fn new(entries: Vec<RegistryEntry>) -> Self {
        Self { entries }
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, RegistryEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All labels sorted lexicographically.
    ///
    /// One label per connection; identical labels from distinct
    /// connections are all kept.
    pub fn roster(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.entries.iter().map(|e| e.label.clone()).collect();
        labels.sort();
        labels
    }
}

impl IntoIterator for RegistrySnapshot {
    type Item = RegistryEntry;
    type IntoIter = std::vec::IntoIter<RegistryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a RegistrySnapshot {
    type Item = &'a RegistryEntry;
    type IntoIter = std::slice::Iter<'a, RegistryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hub::{OutboundEvent, TransportError};

    struct NullConnection(ConnectionId);

    #[async_trait]
    impl Connection for NullConnection {
        fn id(&self) -> ConnectionId {
            self.0
        }

        async fn send(&self, _event: &OutboundEvent) -> Result<(), TransportError> {
            Ok(())
        }

        async fn close(&self) {}
    }

    fn entry(label: &str) -> RegistryEntry {
        RegistryEntry {
            connection: Arc::new(NullConnection(ConnectionId::new())),
            label: label.to_string(),
        }
    }

    #[test]
    fn roster_is_sorted_and_keeps_duplicates() {
        let snapshot = RegistrySnapshot::new(vec![
            entry("carol"),
            entry("alice"),
            entry("bob"),
            entry("alice"),
            entry(""),
        ]);

        assert_eq!(snapshot.roster(), vec!["", "alice", "alice", "bob", "carol"]);
    }

    #[test]
    fn snapshot_iteration_is_restartable() {
        let snapshot = RegistrySnapshot::new(vec![entry("a"), entry("b")]);

        let first: Vec<_> = snapshot.iter().map(|e| e.id()).collect();
        let second: Vec<_> = snapshot.iter().map(|e| e.id()).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn entries_are_told_apart_by_connection_not_label() {
        let a = entry("same");
        let b = entry("same");
        let snapshot = RegistrySnapshot::new(vec![a.clone()]);

        assert!(snapshot.iter().any(|e| e.id() == a.id()));
        assert!(!snapshot.iter().any(|e| e.id() == b.id()));
    }

    #[test]
    fn empty_snapshot_has_empty_roster() {
        let snapshot = RegistrySnapshot::default();
        assert!(snapshot.is_empty());
        assert!(snapshot.roster().is_empty());
    }
}
