//! Core resolver types shared across modules

use serde::{Deserialize, Serialize};

/// The wildcard that matches every index, alias or type
pub const ALL_PATTERN: &str = "*";

/// Legacy keyword equivalent to the all-matching wildcard
pub const ALL_KEYWORD: &str = "_all";

/// Separator between a remote cluster qualifier and an index pattern
pub const REMOTE_CLUSTER_SEPARATOR: char = ':';

/// Group key under which locally resolvable patterns are reported by the
/// remote topology
pub const LOCAL_CLUSTER_GROUP_KEY: &str = "";

/// Options controlling how index patterns are expanded against cluster
/// metadata
///
/// Mirrors the leniency knobs a request may carry: whether missing concrete
/// names are an error, whether a wildcard is allowed to match nothing, and
/// which index states wildcards expand to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionOptions {
    /// Skip concrete names that do not exist instead of failing
    pub ignore_unavailable: bool,
    /// Permit a wildcard expression that matches no index
    pub allow_no_indices: bool,
    /// Expand wildcards to open indices
    pub expand_wildcards_open: bool,
    /// Expand wildcards to closed indices
    pub expand_wildcards_closed: bool,
}

impl ResolutionOptions {
    /// The conservative option set used when request-supplied options are
    /// not honored: missing names fail, empty wildcard expansion is
    /// tolerated, only open indices are expanded.
    pub fn lenient_expand_open() -> Self {
        Self {
            ignore_unavailable: false,
            allow_no_indices: true,
            expand_wildcards_open: true,
            expand_wildcards_closed: false,
        }
    }

    /// Lenient everywhere, expanding to open and closed indices
    pub fn lenient_expand_all() -> Self {
        Self {
            ignore_unavailable: true,
            allow_no_indices: true,
            expand_wildcards_open: true,
            expand_wildcards_closed: true,
        }
    }
}

impl Default for ResolutionOptions {
    fn default() -> Self {
        Self::lenient_expand_open()
    }
}

/// Identifies one of the recognized request shapes
///
/// Used as the key of the process-wide type-capability table and in
/// diagnostics. `Unknown` covers every shape the dispatcher does not
/// understand; such requests are treated as not indices-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    Search,
    FieldCaps,
    Get,
    TermVectors,
    MultiTermVectors,
    DocWrite,
    Bulk,
    BulkShard,
    MultiGet,
    MultiGetItem,
    MultiSearch,
    Aliases,
    AliasAction,
    PutMapping,
    CreateIndex,
    Reindex,
    RestoreSnapshot,
    Replication,
    Replaceable,
    ClearScroll,
    SearchScroll,
    Nodes,
    Main,
    Unknown,
}

impl RequestKind {
    /// Whether this kind of request can take part in cross-cluster search
    /// and therefore supports remote-qualified patterns
    pub fn supports_remote_indices(self) -> bool {
        matches!(self, RequestKind::Search | RequestKind::FieldCaps)
    }
}
