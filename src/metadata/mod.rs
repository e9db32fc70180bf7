//! Cluster metadata access
//!
//! The resolver works against point-in-time snapshots of the index/alias
//! topology, obtained through [`ClusterStateProvider`]. Production wires
//! this to the live cluster service; tests swap in
//! [`InMemoryClusterStateProvider`].

mod datemath;
mod state;

pub use datemath::{resolve_date_math, resolve_date_math_at};
pub use state::{ClusterState, ClusterStateBuilder, IndexMetadata, IndexState, MetadataError};

use std::sync::Arc;

use parking_lot::RwLock;

/// Source of cluster metadata snapshots
pub trait ClusterStateProvider: Send + Sync {
    /// Returns the current topology snapshot
    ///
    /// Called once at the start of a resolution; the returned snapshot is
    /// used for the whole call.
    fn state(&self) -> Arc<ClusterState>;

    /// Whether the local node is the elected master
    ///
    /// `None` means not yet known. Snapshot-restore resolution is skipped on
    /// nodes that are known not to be the master.
    fn is_local_node_elected_master(&self) -> Option<bool> {
        Some(true)
    }
}

/// In-memory snapshot holder, useful for tests and embedding
#[derive(Debug)]
pub struct InMemoryClusterStateProvider {
    state: RwLock<Arc<ClusterState>>,
    elected_master: Option<bool>,
}

impl InMemoryClusterStateProvider {
    pub fn new(state: ClusterState) -> Self {
        Self {
            state: RwLock::new(Arc::new(state)),
            elected_master: Some(true),
        }
    }

    /// Overrides the elected-master answer
    pub fn with_elected_master(mut self, elected: Option<bool>) -> Self {
        self.elected_master = elected;
        self
    }

    /// Swaps in a new topology snapshot
    pub fn update(&self, state: ClusterState) {
        *self.state.write() = Arc::new(state);
    }
}

impl ClusterStateProvider for InMemoryClusterStateProvider {
    fn state(&self) -> Arc<ClusterState> {
        Arc::clone(&self.state.read())
    }

    fn is_local_node_elected_master(&self) -> Option<bool> {
        self.elected_master
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_isolation() {
        let provider = InMemoryClusterStateProvider::new(ClusterState::builder().index("a").build());
        let before = provider.state();

        provider.update(ClusterState::builder().index("b").build());
        let after = provider.state();

        assert!(before.has_index_or_alias("a"));
        assert!(!before.has_index_or_alias("b"));
        assert!(after.has_index_or_alias("b"));
    }

    #[test]
    fn test_elected_master_default_and_override() {
        let provider = InMemoryClusterStateProvider::new(ClusterState::default());
        assert_eq!(provider.is_local_node_elected_master(), Some(true));

        let provider = provider.with_elected_master(Some(false));
        assert_eq!(provider.is_local_node_elected_master(), Some(false));
    }
}
