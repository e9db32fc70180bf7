//! Point-in-time cluster metadata snapshot
//!
//! A [`ClusterState`] is an immutable view of the indices and aliases known
//! to the cluster. A resolution call captures one snapshot up front and works
//! against it for its whole duration, so concurrent topology changes are only
//! observed by later calls.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::matcher;
use crate::metadata::datemath::resolve_date_math;
use crate::types::{ResolutionOptions, ALL_KEYWORD, ALL_PATTERN};

/// Errors raised while matching patterns against cluster metadata
///
/// These never leave the crate: the pattern resolver recovers from a missing
/// index by falling back to the literal name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    /// No index or alias exists for the given expression
    #[error("no such index: {0}")]
    IndexNotFound(String),
}

/// Lifecycle state of an index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexState {
    Open,
    Closed,
}

/// Metadata of a single concrete index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub name: String,
    pub state: IndexState,
}

/// Immutable snapshot of the index and alias topology
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterState {
    indices: BTreeMap<String, IndexMetadata>,
    aliases: BTreeMap<String, BTreeSet<String>>,
}

impl ClusterState {
    /// Starts building a snapshot
    pub fn builder() -> ClusterStateBuilder {
        ClusterStateBuilder::default()
    }

    /// All alias names known to this snapshot
    pub fn alias_names(&self) -> impl Iterator<Item = &String> {
        self.aliases.keys()
    }

    /// Concrete member indices of an alias
    pub fn alias_members(&self, alias: &str) -> Option<&BTreeSet<String>> {
        self.aliases.get(alias)
    }

    /// Whether the exact name refers to an index or an alias
    pub fn has_index_or_alias(&self, name: &str) -> bool {
        self.indices.contains_key(name) || self.aliases.contains_key(name)
    }

    /// Whether a pattern list means "every index"
    ///
    /// An empty list and the single `_all` keyword are equivalent.
    pub fn is_all_indices(patterns: &[String]) -> bool {
        patterns.is_empty() || (patterns.len() == 1 && patterns[0] == ALL_KEYWORD)
    }

    /// Expands a pattern list to concrete index names
    ///
    /// Each pattern goes through date-math resolution first. Wildcards are
    /// expanded over index and alias names subject to the open/closed
    /// expansion options; aliases contribute their member indices. A missing
    /// concrete name fails with [`MetadataError::IndexNotFound`] unless
    /// `ignore_unavailable` is set, and a wildcard matching nothing fails the
    /// same way unless `allow_no_indices` is set.
    pub fn concrete_index_names(
        &self,
        options: &ResolutionOptions,
        patterns: &[String],
    ) -> Result<Vec<String>, MetadataError> {
        if Self::is_all_indices(patterns) {
            return Ok(self.expandable_indices(options));
        }

        let mut resolved: Vec<String> = Vec::with_capacity(patterns.len());
        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut push = |name: String, resolved: &mut Vec<String>| {
            if seen.insert(name.clone()) {
                resolved.push(name);
            }
        };

        for raw in patterns {
            let pattern = resolve_date_math(raw);

            if pattern == ALL_PATTERN || pattern == ALL_KEYWORD {
                for name in self.expandable_indices(options) {
                    push(name, &mut resolved);
                }
                continue;
            }

            if matcher::is_wildcard(&pattern) {
                let mut hits = 0usize;
                for name in self.expandable_indices(options) {
                    if matcher::matches(&pattern, &name) {
                        push(name, &mut resolved);
                        hits += 1;
                    }
                }
                for (alias, members) in &self.aliases {
                    if matcher::matches(&pattern, alias) {
                        hits += 1;
                        for member in members {
                            push(member.clone(), &mut resolved);
                        }
                    }
                }
                if hits == 0 && !options.allow_no_indices {
                    return Err(MetadataError::IndexNotFound(pattern));
                }
                continue;
            }

            if let Some(index) = self.indices.get(&pattern) {
                push(index.name.clone(), &mut resolved);
            } else if let Some(members) = self.aliases.get(&pattern) {
                for member in members {
                    push(member.clone(), &mut resolved);
                }
            } else if options.ignore_unavailable {
                trace!(pattern, "concrete name unavailable, skipped");
            } else {
                return Err(MetadataError::IndexNotFound(pattern));
            }
        }

        Ok(resolved)
    }

    /// Index names visible to wildcard expansion under the given options
    fn expandable_indices(&self, options: &ResolutionOptions) -> Vec<String> {
        self.indices
            .values()
            .filter(|index| match index.state {
                IndexState::Open => options.expand_wildcards_open,
                IndexState::Closed => options.expand_wildcards_closed,
            })
            .map(|index| index.name.clone())
            .collect()
    }
}

/// Builder for [`ClusterState`] snapshots
#[derive(Debug, Default)]
pub struct ClusterStateBuilder {
    indices: BTreeMap<String, IndexMetadata>,
    aliases: BTreeMap<String, BTreeSet<String>>,
}

impl ClusterStateBuilder {
    /// Adds an open index
    pub fn index(self, name: impl Into<String>) -> Self {
        self.index_with_state(name, IndexState::Open)
    }

    /// Adds an index in the given state
    pub fn index_with_state(mut self, name: impl Into<String>, state: IndexState) -> Self {
        let name = name.into();
        self.indices
            .insert(name.clone(), IndexMetadata { name, state });
        self
    }

    /// Adds an alias over the given member indices
    ///
    /// Members that are not yet known are added as open indices.
    pub fn alias<I, S>(mut self, name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = BTreeSet::new();
        for member in members {
            let member = member.into();
            self.indices
                .entry(member.clone())
                .or_insert_with(|| IndexMetadata {
                    name: member.clone(),
                    state: IndexState::Open,
                });
            set.insert(member);
        }
        self.aliases.insert(name.into(), set);
        self
    }

    pub fn build(self) -> ClusterState {
        ClusterState {
            indices: self.indices,
            aliases: self.aliases,
        }
    }
}
