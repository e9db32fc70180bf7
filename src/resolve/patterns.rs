//! The core pattern resolution algorithm
//!
//! Turns a raw pattern list into a [`Resolved`] aggregate against one
//! metadata snapshot: fast-path ALL detection, remote-qualifier splitting,
//! alias matching, concrete-name expansion with literal fallback, and type
//! resolution.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::matcher;
use crate::metadata::{resolve_date_math, ClusterState, MetadataError};
use crate::request::LeafView;
use crate::resolve::remote::{build_remote_index_name, split_qualifier, RemoteClusterResolver};
use crate::resolve::resolved::{
    is_all_with_no_remote, is_local_all_patterns, Builder, Resolved,
};
use crate::types::{ResolutionOptions, ALL_PATTERN, LOCAL_CLUSTER_GROUP_KEY};

/// Resolves pattern lists against one cluster snapshot and one remote
/// topology
///
/// Borrowed per resolution call; the snapshot is never re-read mid-call.
pub(crate) struct PatternResolver<'a> {
    state: &'a ClusterState,
    remote: &'a dyn RemoteClusterResolver,
}

impl<'a> PatternResolver<'a> {
    pub(crate) fn new(state: &'a ClusterState, remote: &'a dyn RemoteClusterResolver) -> Self {
        Self { state, remote }
    }

    /// Resolves one leaf's requested patterns
    pub(crate) fn resolve(
        &self,
        options: &ResolutionOptions,
        leaf: &LeafView<'_>,
        requested: &[String],
    ) -> Resolved {
        trace!(?requested, "resolve requested patterns");

        if is_all_with_no_remote(requested) {
            trace!(?requested, "ALL pattern without remote indices");
            return Resolved::local_all();
        }

        let mut local_patterns: Vec<String> = requested.to_vec();
        let mut remote_indices: BTreeSet<String> = BTreeSet::new();

        if self.remote.is_cross_cluster_search_enabled()
            && leaf.kind().supports_remote_indices()
        {
            let groups = self.remote.group_indices(options, requested, &|name| {
                self.state.has_index_or_alias(name)
            });

            let remote_clusters: BTreeSet<String> = groups
                .keys()
                .filter(|cluster| cluster.as_str() != LOCAL_CLUSTER_GROUP_KEY)
                .cloned()
                .collect();

            for cluster in &remote_clusters {
                if let Some(indices) = groups.get(cluster) {
                    for index in indices {
                        remote_indices.insert(build_remote_index_name(cluster, index));
                    }
                }
            }

            local_patterns.retain(|pattern| match split_qualifier(pattern) {
                Some((prefix, _)) => !matcher::match_any(&remote_clusters, prefix),
                None => true,
            });

            trace!(
                ?local_patterns,
                ?remote_indices,
                "cross-cluster search enabled, split patterns"
            );
        }

        if is_local_all_patterns(requested) {
            trace!(?requested, "LOCAL ALL pattern");
            let all = vec![ALL_PATTERN.to_string()];
            let mut builder =
                Builder::with_sets(all.clone(), all.clone(), all, requested, remote_indices);
            builder.add_types(leaf.doc_types());
            return builder.build();
        }

        if local_patterns.is_empty() && !remote_indices.is_empty() {
            trace!(?requested, "purely remote request, no local resolution");
            let mut builder = Resolved::builder();
            builder.add_original_requested(requested.iter().cloned());
            builder.add_remote_indices(remote_indices);
            return builder.build();
        }

        let alias_names: Vec<String> = self.state.alias_names().cloned().collect();

        let mut matching_aliases: BTreeSet<String> = BTreeSet::new();
        for pattern in &local_patterns {
            let resolved_pattern = resolve_date_math(pattern);
            matching_aliases.extend(matcher::matching(&resolved_pattern, &alias_names));
        }

        let matching_all_indices: Vec<String> =
            match self.state.concrete_index_names(options, &local_patterns) {
                Ok(names) => {
                    debug!(?local_patterns, ?names, "resolved patterns");
                    names
                }
                Err(MetadataError::IndexNotFound(_)) => {
                    // recover with the literal, date-math-resolved names
                    debug!(?local_patterns, "no such indices for patterns, using raw values");
                    local_patterns
                        .iter()
                        .map(|pattern| resolve_date_math(pattern))
                        .collect()
                }
            };

        // an index already represented through a matched alias must not be
        // double-counted in the plain index set
        let matching_indices: Vec<String> = if matching_aliases.is_empty() {
            matching_all_indices.clone()
        } else {
            matching_all_indices
                .iter()
                .filter(|index| {
                    !matching_aliases.iter().any(|alias| {
                        self.state
                            .alias_members(alias)
                            .is_some_and(|members| members.contains(*index))
                    })
                })
                .cloned()
                .collect()
        };

        let mut builder = Builder::with_sets(
            matching_aliases.into_iter().collect(),
            matching_indices,
            matching_all_indices,
            requested,
            remote_indices,
        );
        builder.add_types(leaf.doc_types());
        builder.build()
    }
}
