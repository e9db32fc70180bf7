//! Request shapes and the leaf view the resolver works on

mod capability;
mod shapes;

pub use capability::{type_capability, TypeCapability};
pub use shapes::{
    ActionRequest, AliasAction, AliasActionKind, AliasesRequest, BulkRequest, BulkShardRequest,
    CreateIndexRequest, DocWriteOp, DocWriteRequest, FieldCapsRequest, GetItem, GetRequest,
    MultiGetRequest, MultiSearchRequest, MultiTermVectorsRequest, PutMappingRequest,
    ReindexRequest, ReplaceableRequest, ReplicationRequest, RestoreSnapshotRequest, SearchRequest,
    TermVectorsRequest,
};

use tracing::trace;

use crate::types::{RequestKind, ResolutionOptions};

/// Borrowed view of one pattern-bearing leaf within a request
///
/// Batch shapes dissolve into one view per child; everything the pattern
/// resolver needs about a leaf (shape tag, leniency options, legacy type
/// qualifiers) is readable through this view.
#[derive(Debug, Clone, Copy)]
pub enum LeafView<'a> {
    Search(&'a SearchRequest),
    FieldCaps(&'a FieldCapsRequest),
    Get(&'a GetRequest),
    DocWrite(&'a DocWriteRequest),
    BulkShard(&'a BulkShardRequest),
    GetItem(&'a GetItem),
    TermVectors(&'a TermVectorsRequest),
    AliasAction(&'a AliasAction),
    PutMapping(&'a PutMappingRequest),
    CreateIndex(&'a CreateIndexRequest),
    RestoreSnapshot(&'a RestoreSnapshotRequest),
    Replication(&'a ReplicationRequest),
    Replaceable(&'a ReplaceableRequest),
}

impl<'a> LeafView<'a> {
    /// The shape tag of this leaf
    pub fn kind(&self) -> RequestKind {
        match self {
            LeafView::Search(_) => RequestKind::Search,
            LeafView::FieldCaps(_) => RequestKind::FieldCaps,
            LeafView::Get(_) => RequestKind::Get,
            LeafView::DocWrite(_) => RequestKind::DocWrite,
            LeafView::BulkShard(_) => RequestKind::BulkShard,
            LeafView::GetItem(_) => RequestKind::MultiGetItem,
            LeafView::TermVectors(_) => RequestKind::TermVectors,
            LeafView::AliasAction(_) => RequestKind::AliasAction,
            LeafView::PutMapping(_) => RequestKind::PutMapping,
            LeafView::CreateIndex(_) => RequestKind::CreateIndex,
            LeafView::RestoreSnapshot(_) => RequestKind::RestoreSnapshot,
            LeafView::Replication(_) => RequestKind::Replication,
            LeafView::Replaceable(_) => RequestKind::Replaceable,
        }
    }

    /// The leaf's current resource patterns, merging split fields where a
    /// shape carries both a single-index field and an array
    pub fn current_patterns(&self) -> Vec<String> {
        match self {
            LeafView::Search(r) => r.indices.clone(),
            LeafView::FieldCaps(r) => r.indices.clone(),
            LeafView::Get(r) => {
                let mut patterns = Vec::with_capacity(1 + r.indices.len());
                if let Some(index) = &r.index {
                    patterns.push(index.clone());
                }
                patterns.extend(r.indices.iter().cloned());
                patterns
            }
            LeafView::DocWrite(r) => r.index.iter().cloned().collect(),
            LeafView::BulkShard(r) => r.indices.clone(),
            LeafView::GetItem(r) => r.index.iter().cloned().collect(),
            LeafView::TermVectors(r) => r.index.iter().cloned().collect(),
            LeafView::AliasAction(r) => r.indices.clone(),
            LeafView::PutMapping(r) => {
                if r.indices.is_empty() {
                    r.concrete_index.iter().cloned().collect()
                } else {
                    r.indices.clone()
                }
            }
            LeafView::CreateIndex(r) => r.index.iter().cloned().collect(),
            LeafView::RestoreSnapshot(r) => r.indices.clone(),
            LeafView::Replication(r) => r.index.iter().cloned().collect(),
            LeafView::Replaceable(r) => r.indices.clone(),
        }
    }

    /// Request-supplied resolution options, if the shape carries them
    pub fn resolution_options(&self) -> Option<ResolutionOptions> {
        match self {
            LeafView::Search(r) => r.options,
            LeafView::FieldCaps(r) => r.options,
            LeafView::RestoreSnapshot(r) => r.options,
            LeafView::Replaceable(r) => r.options,
            _ => None,
        }
    }

    /// Legacy type qualifiers referenced by this leaf
    ///
    /// The common shapes have dedicated accessors; everything else goes
    /// through the capability table and the generic fallback accessors.
    /// Absence of a type accessor yields no constraint.
    pub fn doc_types(&self) -> Vec<String> {
        let types = match self {
            LeafView::BulkShard(r) => r
                .items
                .iter()
                .filter_map(|item| item.doc_type.clone())
                .collect(),
            LeafView::DocWrite(r) => r.doc_type.iter().cloned().collect(),
            LeafView::Search(r) => r.doc_types.clone(),
            LeafView::Get(r) => r.doc_type.iter().cloned().collect(),
            _ => {
                let capability = type_capability(self.kind());
                let mut types = Vec::new();
                if capability.single {
                    if let Some(doc_type) = self.fallback_single_type() {
                        types.push(doc_type.to_string());
                    }
                }
                if capability.multi {
                    if let Some(multi) = self.fallback_multi_types() {
                        types.extend(multi.iter().cloned());
                    }
                }
                types
            }
        };

        trace!(kind = ?self.kind(), ?types, "request types");
        types
    }

    /// Generic single-type accessor used by the capability fallback
    fn fallback_single_type(&self) -> Option<&str> {
        match self {
            LeafView::GetItem(r) => r.doc_type.as_deref(),
            LeafView::TermVectors(r) => r.doc_type.as_deref(),
            LeafView::PutMapping(r) => r.doc_type.as_deref(),
            _ => None,
        }
    }

    /// Generic type-array accessor used by the capability fallback
    fn fallback_multi_types(&self) -> Option<&'a [String]> {
        // no current shape reaches this path; kept as the seam for shapes
        // that grow a type array
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_merges_index_and_indices() {
        let get = GetRequest {
            index: Some("a".to_string()),
            indices: vec!["b".to_string(), "c".to_string()],
            doc_type: None,
        };
        assert_eq!(
            LeafView::Get(&get).current_patterns(),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_put_mapping_synthesizes_from_concrete_index() {
        let pmr = PutMappingRequest {
            concrete_index: Some("resolved-0001".to_string()),
            indices: vec![],
            doc_type: None,
        };
        assert_eq!(
            LeafView::PutMapping(&pmr).current_patterns(),
            vec!["resolved-0001".to_string()]
        );

        let pmr = PutMappingRequest {
            concrete_index: Some("resolved-0001".to_string()),
            indices: vec!["pattern-*".to_string()],
            doc_type: None,
        };
        assert_eq!(
            LeafView::PutMapping(&pmr).current_patterns(),
            vec!["pattern-*".to_string()]
        );
    }

    #[test]
    fn test_doc_types_from_dedicated_accessors() {
        let mut search = SearchRequest::new(["idx"]);
        search.doc_types = vec!["event".to_string(), "log".to_string()];
        assert_eq!(
            LeafView::Search(&search).doc_types(),
            vec!["event".to_string(), "log".to_string()]
        );

        let mut write = DocWriteRequest::new(DocWriteOp::Index, "idx");
        write.doc_type = Some("doc".to_string());
        assert_eq!(LeafView::DocWrite(&write).doc_types(), vec!["doc".to_string()]);
    }

    #[test]
    fn test_doc_types_via_capability_fallback() {
        let mut tvr = TermVectorsRequest::new("idx");
        tvr.doc_type = Some("doc".to_string());
        assert_eq!(LeafView::TermVectors(&tvr).doc_types(), vec!["doc".to_string()]);

        let car = CreateIndexRequest::new("idx");
        assert!(LeafView::CreateIndex(&car).doc_types().is_empty());
    }

    #[test]
    fn test_bulk_shard_collects_item_types() {
        let bsr = BulkShardRequest {
            indices: vec!["idx".to_string()],
            items: vec![
                DocWriteRequest {
                    op: DocWriteOp::Index,
                    index: Some("idx".to_string()),
                    doc_type: Some("a".to_string()),
                },
                DocWriteRequest {
                    op: DocWriteOp::Delete,
                    index: Some("idx".to_string()),
                    doc_type: Some("b".to_string()),
                },
            ],
        };
        assert_eq!(
            LeafView::BulkShard(&bsr).doc_types(),
            vec!["a".to_string(), "b".to_string()]
        );
    }
}
