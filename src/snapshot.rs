//! Snapshot catalog access and restore-target computation
//!
//! A restore request names indices inside a snapshot, not live indices, so
//! its patterns are resolved against the snapshot's content and optionally
//! renamed before they reach the pattern provider.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use regex::Regex;
use tracing::debug;

use crate::error::{Result, ResolverError};
use crate::matcher;
use crate::request::RestoreSnapshotRequest;
use crate::types::{ResolutionOptions, ALL_KEYWORD, ALL_PATTERN};

/// What one snapshot contains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotInfo {
    pub name: String,
    pub indices: Vec<String>,
}

impl SnapshotInfo {
    pub fn new<I, S>(name: impl Into<String>, indices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            indices: indices.into_iter().map(Into::into).collect(),
        }
    }
}

/// Read access to the snapshot catalog
pub trait SnapshotRepository: Send + Sync {
    /// Looks up a snapshot by repository and snapshot name
    fn snapshot_info(&self, repository: &str, snapshot: &str) -> Option<SnapshotInfo>;
}

/// Snapshot catalog held in memory, for tests and embedding
#[derive(Debug, Default)]
pub struct InMemorySnapshotRepository {
    snapshots: RwLock<BTreeMap<(String, String), SnapshotInfo>>,
}

impl InMemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a snapshot under a repository
    pub fn add(&self, repository: impl Into<String>, info: SnapshotInfo) {
        self.snapshots
            .write()
            .insert((repository.into(), info.name.clone()), info);
    }
}

impl SnapshotRepository for InMemorySnapshotRepository {
    fn snapshot_info(&self, repository: &str, snapshot: &str) -> Option<SnapshotInfo> {
        self.snapshots
            .read()
            .get(&(repository.to_string(), snapshot.to_string()))
            .cloned()
    }
}

/// Selects snapshot indices by pattern
///
/// Patterns support wildcards plus `+`/`-` include/exclude prefixes; a
/// leading exclusion implicitly starts from everything. Names missing from
/// the snapshot are skipped, never an error.
pub fn filter_indices(
    available: &[String],
    patterns: &[String],
    options: &ResolutionOptions,
) -> Vec<String> {
    if patterns.is_empty()
        || (patterns.len() == 1 && (patterns[0] == ALL_PATTERN || patterns[0] == ALL_KEYWORD))
    {
        return available.to_vec();
    }

    let mut result: Vec<String> = Vec::new();

    for (position, raw) in patterns.iter().enumerate() {
        let (pattern, include) = match raw.strip_prefix('+') {
            Some(stripped) => (stripped, true),
            None => match raw.strip_prefix('-') {
                Some(stripped) => (stripped, false),
                None => (raw.as_str(), true),
            },
        };

        if position == 0 && !include {
            result = available.to_vec();
        }

        if matcher::is_wildcard(pattern) {
            for name in available {
                if matcher::matches(pattern, name) {
                    apply_selection(&mut result, name, include);
                }
            }
        } else if available.iter().any(|name| name == pattern) {
            apply_selection(&mut result, pattern, include);
        } else if include {
            // tolerated either way, the restore itself surfaces the miss
            debug!(
                pattern,
                ignore_unavailable = options.ignore_unavailable,
                "index not present in snapshot, skipped"
            );
        }
    }

    result
}

fn apply_selection(result: &mut Vec<String>, name: &str, include: bool) {
    if include {
        if !result.iter().any(|existing| existing == name) {
            result.push(name.to_string());
        }
    } else {
        result.retain(|existing| existing != name);
    }
}

/// Applies the restore rename to the filtered snapshot indices
///
/// A malformed rename pattern is the caller's bug and the only fatal error
/// in pattern resolution.
pub fn renamed_indices(request: &RestoreSnapshotRequest, filtered: &[String]) -> Result<Vec<String>> {
    let (Some(pattern), Some(replacement)) =
        (&request.rename_pattern, &request.rename_replacement)
    else {
        return Ok(filtered.to_vec());
    };

    let regex = Regex::new(pattern).map_err(|source| ResolverError::InvalidRenamePattern {
        pattern: pattern.clone(),
        source: Box::new(source),
    })?;

    Ok(filtered
        .iter()
        .map(|index| regex.replace_all(index, replacement.as_str()).into_owned())
        .collect())
}
