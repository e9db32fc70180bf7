//! Remote cluster topology and pattern splitting
//!
//! Cross-cluster patterns carry a `cluster:pattern` qualifier. A prefix is a
//! remote qualifier only when it exactly names a configured remote cluster;
//! anything else stays local, so a literal index containing the separator is
//! not misinterpreted.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::types::{ResolutionOptions, LOCAL_CLUSTER_GROUP_KEY, REMOTE_CLUSTER_SEPARATOR};

/// Builds the fully qualified `cluster:index` name
pub fn build_remote_index_name(cluster: &str, index: &str) -> String {
    format!("{cluster}{REMOTE_CLUSTER_SEPARATOR}{index}")
}

/// Splits a pattern at the first separator occurrence
///
/// Returns `(prefix, remainder)` when a separator is present.
pub fn split_qualifier(pattern: &str) -> Option<(&str, &str)> {
    pattern
        .split_once(REMOTE_CLUSTER_SEPARATOR)
        .filter(|(prefix, _)| !prefix.is_empty())
}

/// Access to the remote cluster topology
///
/// Implementations return in-memory snapshots; the resolver never waits on
/// the network here.
pub trait RemoteClusterResolver: Send + Sync {
    /// Whether cross-cluster search is configured at all
    fn is_cross_cluster_search_enabled(&self) -> bool;

    /// Names of the currently configured remote clusters
    fn cluster_names(&self) -> BTreeSet<String>;

    /// Partitions patterns by owning cluster
    ///
    /// Locally resolvable patterns are grouped under
    /// [`LOCAL_CLUSTER_GROUP_KEY`]; each remote group maps to the pattern
    /// remainders with the qualifier stripped. `exists_locally` lets an
    /// implementation notice when a remote-looking name also names a local
    /// index.
    fn group_indices(
        &self,
        options: &ResolutionOptions,
        patterns: &[String],
        exists_locally: &dyn Fn(&str) -> bool,
    ) -> BTreeMap<String, Vec<String>>;
}

/// Remote topology backed by a fixed cluster-name set
#[derive(Debug, Default)]
pub struct StaticRemoteClusters {
    enabled: bool,
    clusters: BTreeSet<String>,
}

impl StaticRemoteClusters {
    /// A topology with cross-cluster search disabled
    pub fn disabled() -> Self {
        Self::default()
    }

    /// A topology with the given remote clusters configured
    pub fn new<I, S>(clusters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enabled: true,
            clusters: clusters.into_iter().map(Into::into).collect(),
        }
    }
}

impl RemoteClusterResolver for StaticRemoteClusters {
    fn is_cross_cluster_search_enabled(&self) -> bool {
        self.enabled
    }

    fn cluster_names(&self) -> BTreeSet<String> {
        self.clusters.clone()
    }

    fn group_indices(
        &self,
        _options: &ResolutionOptions,
        patterns: &[String],
        exists_locally: &dyn Fn(&str) -> bool,
    ) -> BTreeMap<String, Vec<String>> {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for pattern in patterns {
            match split_qualifier(pattern) {
                Some((prefix, remainder)) if self.clusters.contains(prefix) => {
                    if exists_locally(pattern) {
                        warn!(
                            pattern,
                            cluster = prefix,
                            "pattern matches a remote cluster and a local name, treating as remote"
                        );
                    }
                    groups
                        .entry(prefix.to_string())
                        .or_default()
                        .push(remainder.to_string());
                }
                _ => {
                    groups
                        .entry(LOCAL_CLUSTER_GROUP_KEY.to_string())
                        .or_default()
                        .push(pattern.clone());
                }
            }
        }

        groups
    }
}
