//! The resolved aggregate: what a request actually touches

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{ALL_KEYWORD, ALL_PATTERN};

/// Immutable snapshot of the aliases, indices and types a request resolves
/// to
///
/// `indices` excludes names already represented through a matched alias;
/// `all_indices` is the authoritative "everything touched" set.
/// `remote_indices` keeps cluster-qualified names verbatim and outside the
/// local sets. `original_requested` preserves the caller's patterns for
/// traceability.
///
/// Invariant: `types` is never empty while any of the three resource sets is
/// non-empty. Violating it is a bug in the pattern resolver, asserted at
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolved {
    aliases: BTreeSet<String>,
    indices: BTreeSet<String>,
    all_indices: BTreeSet<String>,
    types: BTreeSet<String>,
    original_requested: BTreeSet<String>,
    remote_indices: BTreeSet<String>,
}

/// Returns whether a pattern list addresses every local index
///
/// The literal `_all`, the bare wildcard `*` anywhere in the list, and an
/// absent/empty list are semantically identical.
pub fn is_local_all_patterns(patterns: &[String]) -> bool {
    patterns.is_empty()
        || patterns.iter().any(|p| p == ALL_PATTERN || p == ALL_KEYWORD)
}

/// Returns whether a pattern list is the unqualified ALL request
///
/// Narrower than [`is_local_all_patterns`]: `_all` mixed with other
/// patterns does not qualify, and neither does `*` alongside anything else.
pub fn is_all_with_no_remote(patterns: &[String]) -> bool {
    patterns.is_empty()
        || (patterns.len() == 1 && (patterns[0] == ALL_PATTERN || patterns[0] == ALL_KEYWORD))
}

impl Resolved {
    fn new(
        aliases: BTreeSet<String>,
        indices: BTreeSet<String>,
        all_indices: BTreeSet<String>,
        types: BTreeSet<String>,
        original_requested: BTreeSet<String>,
        remote_indices: BTreeSet<String>,
    ) -> Self {
        assert!(
            !types.is_empty()
                || (aliases.is_empty() && indices.is_empty() && all_indices.is_empty()),
            "empty types for non-empty indices or aliases"
        );

        Self {
            aliases,
            indices,
            all_indices,
            types,
            original_requested,
            remote_indices,
        }
    }

    /// The canonical "matches everything in the local cluster" resolution
    pub fn local_all() -> Self {
        let all: BTreeSet<String> = [ALL_PATTERN.to_string()].into();
        Self {
            aliases: all.clone(),
            indices: all.clone(),
            all_indices: all.clone(),
            types: all,
            original_requested: BTreeSet::new(),
            remote_indices: BTreeSet::new(),
        }
    }

    /// Starts accumulating a resolution
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Whether this resolution covers the whole local cluster
    pub fn is_local_all(&self) -> bool {
        let original: Vec<String> = self.original_requested.iter().cloned().collect();
        if is_local_all_patterns(&original) {
            return true;
        }

        self.aliases.contains(ALL_PATTERN)
            && self.indices.contains(ALL_PATTERN)
            && self.all_indices.contains(ALL_PATTERN)
            && self.types.contains(ALL_PATTERN)
    }

    /// Resource-group names matched by the request
    pub fn aliases(&self) -> &BTreeSet<String> {
        &self.aliases
    }

    /// Concrete indices matched outside of any matched alias
    pub fn indices(&self) -> &BTreeSet<String> {
        &self.indices
    }

    /// Every local index touched, including alias members
    pub fn all_indices(&self) -> &BTreeSet<String> {
        &self.all_indices
    }

    /// Legacy type qualifiers; `*` when unconstrained
    pub fn types(&self) -> &BTreeSet<String> {
        &self.types
    }

    /// The caller's patterns, verbatim
    pub fn original_requested(&self) -> &BTreeSet<String> {
        &self.original_requested
    }

    /// Cluster-qualified remote names, excluded from local resolution
    pub fn remote_indices(&self) -> &BTreeSet<String> {
        &self.remote_indices
    }
}

/// Mutable accumulator for compound resolutions
///
/// One builder lives for one resolution call: batch requests add one partial
/// [`Resolved`] per child and [`Builder::build`] produces the aggregate.
#[derive(Debug, Default)]
pub struct Builder {
    aliases: BTreeSet<String>,
    indices: BTreeSet<String>,
    all_indices: BTreeSet<String>,
    types: BTreeSet<String>,
    original_requested: BTreeSet<String>,
    remote_indices: BTreeSet<String>,
}

impl Builder {
    /// Seeds the resource sets of a fresh builder
    pub(crate) fn with_sets(
        aliases: Vec<String>,
        indices: Vec<String>,
        all_indices: Vec<String>,
        original_requested: &[String],
        remote_indices: BTreeSet<String>,
    ) -> Self {
        Self {
            aliases: aliases.into_iter().collect(),
            indices: indices.into_iter().collect(),
            all_indices: all_indices.into_iter().collect(),
            types: BTreeSet::new(),
            original_requested: original_requested.iter().cloned().collect(),
            remote_indices: remote_indices.into_iter().collect(),
        }
    }

    /// Unions a partial resolution into the aggregate
    pub fn add(&mut self, other: &Resolved) -> &mut Self {
        self.aliases.extend(other.aliases.iter().cloned());
        self.indices.extend(other.indices.iter().cloned());
        self.all_indices.extend(other.all_indices.iter().cloned());
        self.original_requested
            .extend(other.original_requested.iter().cloned());
        self.remote_indices
            .extend(other.remote_indices.iter().cloned());
        self.add_types(other.types.iter().cloned());
        self
    }

    /// Adds type qualifiers
    ///
    /// Merge rule: the wildcard type is a placeholder, dropped as soon as
    /// the first concrete type arrives; it is restored by [`Builder::build`]
    /// only if no concrete type was ever added.
    pub fn add_types<I>(&mut self, types: I) -> &mut Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut added_concrete = false;
        for doc_type in types {
            if doc_type != ALL_PATTERN {
                added_concrete = true;
            }
            self.types.insert(doc_type);
        }
        if added_concrete {
            self.types.remove(ALL_PATTERN);
        }
        self
    }

    /// Records the caller's verbatim patterns
    pub fn add_original_requested<I, S>(&mut self, patterns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.original_requested
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Records cluster-qualified remote names
    pub fn add_remote_indices<I, S>(&mut self, remote: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.remote_indices.extend(remote.into_iter().map(Into::into));
        self
    }

    /// Finishes the aggregate, restoring the wildcard type if none was set
    pub fn build(&mut self) -> Resolved {
        let mut types = std::mem::take(&mut self.types);
        if types.is_empty() {
            types.insert(ALL_PATTERN.to_string());
        }

        Resolved::new(
            std::mem::take(&mut self.aliases),
            std::mem::take(&mut self.indices),
            std::mem::take(&mut self.all_indices),
            types,
            std::mem::take(&mut self.original_requested),
            std::mem::take(&mut self.remote_indices),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_local_all_constant() {
        let resolved = Resolved::local_all();
        assert_eq!(resolved.aliases(), &set(&["*"]));
        assert_eq!(resolved.indices(), &set(&["*"]));
        assert_eq!(resolved.all_indices(), &set(&["*"]));
        assert_eq!(resolved.types(), &set(&["*"]));
        assert!(resolved.original_requested().is_empty());
        assert!(resolved.remote_indices().is_empty());
        assert!(resolved.is_local_all());
    }

    #[test]
    fn test_is_local_all_patterns() {
        assert!(is_local_all_patterns(&[]));
        assert!(is_local_all_patterns(&["*".to_string()]));
        assert!(is_local_all_patterns(&["_all".to_string()]));
        assert!(is_local_all_patterns(&[
            "idx".to_string(),
            "*".to_string()
        ]));
        assert!(!is_local_all_patterns(&["idx".to_string()]));
    }

    #[test]
    fn test_is_all_with_no_remote_is_narrower() {
        assert!(is_all_with_no_remote(&[]));
        assert!(is_all_with_no_remote(&["*".to_string()]));
        assert!(is_all_with_no_remote(&["_all".to_string()]));
        assert!(!is_all_with_no_remote(&[
            "idx".to_string(),
            "*".to_string()
        ]));
    }

    #[test]
    fn test_builder_restores_wildcard_type() {
        let mut builder = Resolved::builder();
        builder.add_original_requested(["idx"]);
        let resolved = builder.build();
        assert_eq!(resolved.types(), &set(&["*"]));
    }

    #[test]
    fn test_concrete_type_displaces_wildcard() {
        let mut builder = Resolved::builder();
        builder.add_types(["*".to_string()]);
        builder.add_types(["event".to_string()]);
        let resolved = builder.build();
        assert_eq!(resolved.types(), &set(&["event"]));
    }

    #[test]
    fn test_wildcard_after_concrete_is_kept_out() {
        let mut builder = Resolved::builder();
        builder.add_types(["event".to_string()]);
        builder.add_types(["*".to_string()]);
        let resolved = builder.build();
        assert_eq!(resolved.types(), &set(&["event", "*"]));
    }

    #[test]
    fn test_builder_accumulates_partials() {
        let mut seeded = Builder::with_sets(
            vec![],
            vec!["a".to_string()],
            vec!["a".to_string()],
            &["a".to_string()],
            BTreeSet::new(),
        );
        let first = seeded.build();

        let mut second = Builder::with_sets(
            vec!["B".to_string()],
            vec![],
            vec!["b1".to_string(), "b2".to_string()],
            &["B".to_string()],
            BTreeSet::new(),
        );
        let second = second.build();

        let mut aggregate = Resolved::builder();
        aggregate.add(&first).add(&second);
        let resolved = aggregate.build();

        assert_eq!(resolved.indices(), &set(&["a"]));
        assert_eq!(resolved.aliases(), &set(&["B"]));
        assert_eq!(resolved.all_indices(), &set(&["a", "b1", "b2"]));
        assert_eq!(resolved.original_requested(), &set(&["a", "B"]));
    }

    #[test]
    #[should_panic(expected = "empty types")]
    fn test_invariant_violation_panics() {
        // bypass the builder's wildcard restoration
        Resolved::new(
            set(&["alias"]),
            BTreeSet::new(),
            BTreeSet::new(),
            BTreeSet::new(),
            BTreeSet::new(),
            BTreeSet::new(),
        );
    }

    #[test]
    fn test_is_local_all_from_original_patterns() {
        let mut builder = Builder::with_sets(
            vec!["*".to_string()],
            vec!["*".to_string()],
            vec!["*".to_string()],
            &["*".to_string()],
            BTreeSet::new(),
        );
        assert!(builder.build().is_local_all());

        let mut builder = Builder::with_sets(
            vec![],
            vec!["idx".to_string()],
            vec!["idx".to_string()],
            &["idx".to_string()],
            BTreeSet::new(),
        );
        assert!(!builder.build().is_local_all());
    }

    #[test]
    fn test_serde_round_trip() {
        let mut builder = Builder::with_sets(
            vec!["alias".to_string()],
            vec!["idx".to_string()],
            vec!["idx".to_string(), "member".to_string()],
            &["alias".to_string(), "idx".to_string()],
            set(&["remote:logs-*"]),
        );
        let resolved = builder.build();

        let encoded = serde_json::to_string(&resolved).unwrap();
        let decoded: Resolved = serde_json::from_str(&encoded).unwrap();
        assert_eq!(resolved, decoded);
    }
}
