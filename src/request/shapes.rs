//! The closed set of recognized request shapes
//!
//! Every data-access request entering the security layer is one of these
//! variants. Each shape knows which resource-pattern fields it carries and
//! whether it can be rewritten; the dispatcher in `resolve::replacer` is the
//! only place that walks them.

use serde::{Deserialize, Serialize};

use crate::types::{RequestKind, ResolutionOptions};

/// Search over one or more indices, possibly remote-qualified
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub indices: Vec<String>,
    /// Legacy per-document-type qualifiers
    pub doc_types: Vec<String>,
    /// Request-supplied leniency options, if any
    pub options: Option<ResolutionOptions>,
}

impl SearchRequest {
    pub fn new<I, S>(indices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            indices: indices.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Field capabilities lookup, remote-capable like search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCapsRequest {
    pub indices: Vec<String>,
    pub options: Option<ResolutionOptions>,
}

impl FieldCapsRequest {
    pub fn new<I, S>(indices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            indices: indices.into_iter().map(Into::into).collect(),
            options: None,
        }
    }
}

/// Single-document read
///
/// Carries both a single-index field and an index array; the dispatcher
/// merges them into one pattern list before resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRequest {
    pub index: Option<String>,
    pub indices: Vec<String>,
    pub doc_type: Option<String>,
}

impl GetRequest {
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: Some(index.into()),
            ..Self::default()
        }
    }
}

/// Kind of single-document write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocWriteOp {
    Index,
    Create,
    Delete,
    Update,
}

/// Single-document write targeting exactly one index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocWriteRequest {
    pub op: DocWriteOp,
    pub index: Option<String>,
    pub doc_type: Option<String>,
}

impl DocWriteRequest {
    pub fn new(op: DocWriteOp, index: impl Into<String>) -> Self {
        Self {
            op,
            index: Some(index.into()),
            doc_type: None,
        }
    }
}

/// Batch of document writes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkRequest {
    pub requests: Vec<DocWriteRequest>,
}

/// Shard-level slice of a bulk request
///
/// Already routed to concrete shards; consulted read-only, never rewritten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkShardRequest {
    pub indices: Vec<String>,
    pub items: Vec<DocWriteRequest>,
}

/// One item of a multi-get batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetItem {
    pub index: Option<String>,
    pub doc_type: Option<String>,
}

impl GetItem {
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: Some(index.into()),
            doc_type: None,
        }
    }
}

/// Batch of document reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiGetRequest {
    pub items: Vec<GetItem>,
}

/// Batch of searches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSearchRequest {
    pub requests: Vec<SearchRequest>,
}

/// Term vectors for a single document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermVectorsRequest {
    pub index: Option<String>,
    pub doc_type: Option<String>,
}

impl TermVectorsRequest {
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: Some(index.into()),
            doc_type: None,
        }
    }
}

/// Batch of term-vector lookups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiTermVectorsRequest {
    pub requests: Vec<TermVectorsRequest>,
}

/// Kind of alias mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AliasActionKind {
    Add,
    Remove,
    RemoveIndex,
}

/// One action of an alias-management request, rewritable over multiple
/// indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasAction {
    pub kind: AliasActionKind,
    pub indices: Vec<String>,
    pub aliases: Vec<String>,
}

impl AliasAction {
    pub fn new<I, S>(kind: AliasActionKind, indices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            indices: indices.into_iter().map(Into::into).collect(),
            aliases: Vec::new(),
        }
    }
}

/// Alias-management batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasesRequest {
    pub actions: Vec<AliasAction>,
}

/// Mapping update
///
/// May arrive with a pre-resolved concrete index instead of a pattern list;
/// the dispatcher synthesizes the list from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutMappingRequest {
    pub concrete_index: Option<String>,
    pub indices: Vec<String>,
    pub doc_type: Option<String>,
}

/// Index creation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIndexRequest {
    pub index: Option<String>,
}

impl CreateIndexRequest {
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: Some(index.into()),
        }
    }
}

/// Reindex: a search source feeding a write destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReindexRequest {
    pub source: SearchRequest,
    pub destination: DocWriteRequest,
}

/// Snapshot restore
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreSnapshotRequest {
    pub repository: String,
    pub snapshot: String,
    /// Patterns selecting indices within the snapshot
    pub indices: Vec<String>,
    pub rename_pattern: Option<String>,
    pub rename_replacement: Option<String>,
    pub options: Option<ResolutionOptions>,
}

/// Shard-level replicated write targeting one index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationRequest {
    pub index: Option<String>,
}

impl ReplicationRequest {
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: Some(index.into()),
        }
    }
}

/// Catch-all for shapes that only carry a replaceable pattern list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceableRequest {
    /// Action name, for diagnostics only
    pub action: String,
    pub indices: Vec<String>,
    pub options: Option<ResolutionOptions>,
}

impl ReplaceableRequest {
    pub fn new<I, S>(action: impl Into<String>, indices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            action: action.into(),
            indices: indices.into_iter().map(Into::into).collect(),
            options: None,
        }
    }
}

/// Closed tagged union over every recognized request shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionRequest {
    Search(SearchRequest),
    FieldCaps(FieldCapsRequest),
    Get(GetRequest),
    TermVectors(TermVectorsRequest),
    MultiTermVectors(MultiTermVectorsRequest),
    DocWrite(DocWriteRequest),
    Bulk(BulkRequest),
    BulkShard(BulkShardRequest),
    MultiGet(MultiGetRequest),
    MultiSearch(MultiSearchRequest),
    Aliases(AliasesRequest),
    PutMapping(PutMappingRequest),
    CreateIndex(CreateIndexRequest),
    Reindex(ReindexRequest),
    RestoreSnapshot(RestoreSnapshotRequest),
    Replication(ReplicationRequest),
    Replaceable(ReplaceableRequest),
    ClearScroll,
    SearchScroll,
    Nodes,
    Main,
    /// A shape the dispatcher does not understand; the payload is the action
    /// name for diagnostics
    Unknown(String),
}

impl ActionRequest {
    /// The shape tag of this request
    pub fn kind(&self) -> RequestKind {
        match self {
            ActionRequest::Search(_) => RequestKind::Search,
            ActionRequest::FieldCaps(_) => RequestKind::FieldCaps,
            ActionRequest::Get(_) => RequestKind::Get,
            ActionRequest::TermVectors(_) => RequestKind::TermVectors,
            ActionRequest::MultiTermVectors(_) => RequestKind::MultiTermVectors,
            ActionRequest::DocWrite(_) => RequestKind::DocWrite,
            ActionRequest::Bulk(_) => RequestKind::Bulk,
            ActionRequest::BulkShard(_) => RequestKind::BulkShard,
            ActionRequest::MultiGet(_) => RequestKind::MultiGet,
            ActionRequest::MultiSearch(_) => RequestKind::MultiSearch,
            ActionRequest::Aliases(_) => RequestKind::Aliases,
            ActionRequest::PutMapping(_) => RequestKind::PutMapping,
            ActionRequest::CreateIndex(_) => RequestKind::CreateIndex,
            ActionRequest::Reindex(_) => RequestKind::Reindex,
            ActionRequest::RestoreSnapshot(_) => RequestKind::RestoreSnapshot,
            ActionRequest::Replication(_) => RequestKind::Replication,
            ActionRequest::Replaceable(_) => RequestKind::Replaceable,
            ActionRequest::ClearScroll => RequestKind::ClearScroll,
            ActionRequest::SearchScroll => RequestKind::SearchScroll,
            ActionRequest::Nodes => RequestKind::Nodes,
            ActionRequest::Main => RequestKind::Main,
            ActionRequest::Unknown(_) => RequestKind::Unknown,
        }
    }
}
