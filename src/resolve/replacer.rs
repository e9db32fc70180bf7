//! Request walking, resolution and authorization-driven rewriting
//!
//! [`IndexResolverReplacer`] is the engine's entry point. It walks a request
//! down to its pattern-bearing leaves, resolves each leaf against one
//! metadata snapshot, and on the write path swaps the leaves' patterns for
//! an authorized set, validating shape constraints before any write-back.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::matcher;
use crate::metadata::ClusterStateProvider;
use crate::request::{
    ActionRequest, AliasAction, CreateIndexRequest, DocWriteRequest, FieldCapsRequest, GetItem,
    GetRequest, LeafView, PutMappingRequest, ReplaceableRequest, ReplicationRequest,
    RestoreSnapshotRequest, SearchRequest, TermVectorsRequest,
};
use crate::resolve::patterns::PatternResolver;
use crate::resolve::remote::RemoteClusterResolver;
use crate::resolve::resolved::{is_all_with_no_remote, Resolved};
use crate::settings::DynamicSettings;
use crate::snapshot::{filter_indices, renamed_indices, SnapshotRepository};
use crate::types::{RequestKind, ResolutionOptions, ALL_PATTERN};

/// A provider's answer for one leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provided {
    /// Leave the leaf untouched; the dispatcher reports it as unhandled
    Noop,
    /// Replace the leaf's patterns with these
    Patterns(Vec<String>),
}

/// Supplies replacement patterns for one leaf during a mutating walk
///
/// Receives the leaf's current patterns, the leaf view and whether the leaf
/// may be rewritten at all. Shard-level shapes are consulted with
/// `supports_replace == false` and any returned patterns are discarded.
pub type PatternProvider<'p> = dyn FnMut(&[String], &LeafView<'_>, bool) -> Provided + 'p;

type LeafVisitor<'p> = dyn FnMut(&[String], &LeafView<'_>) + 'p;

/// Resolves and rewrites the resource patterns of data-access requests
///
/// One instance serves the whole process. Collaborators are trait objects so
/// tests can swap in in-memory implementations; settings updates swap an
/// immutable snapshot under a short write lock.
pub struct IndexResolverReplacer {
    cluster: Arc<dyn ClusterStateProvider>,
    remote: Arc<dyn RemoteClusterResolver>,
    snapshots: Arc<dyn SnapshotRepository>,
    settings: RwLock<Arc<DynamicSettings>>,
}

impl IndexResolverReplacer {
    pub fn new(
        cluster: Arc<dyn ClusterStateProvider>,
        remote: Arc<dyn RemoteClusterResolver>,
        snapshots: Arc<dyn SnapshotRepository>,
    ) -> Self {
        Self {
            cluster,
            remote,
            snapshots,
            settings: RwLock::new(Arc::new(DynamicSettings::default())),
        }
    }

    /// The currently active settings snapshot
    pub fn settings(&self) -> Arc<DynamicSettings> {
        Arc::clone(&self.settings.read())
    }

    /// Installs a new settings snapshot, bumping the version
    ///
    /// In-flight resolutions keep the snapshot they started with.
    pub fn on_settings_change(&self, settings: DynamicSettings) {
        let mut guard = self.settings.write();
        let version = guard.version + 1;
        *guard = Arc::new(settings.with_version(version));
        debug!(version, "resolver settings updated");
    }

    /// Whether this request carries resource patterns at all
    pub fn is_indices_request(request: &ActionRequest) -> bool {
        !matches!(
            request.kind(),
            RequestKind::ClearScroll
                | RequestKind::SearchScroll
                | RequestKind::Nodes
                | RequestKind::Main
                | RequestKind::Unknown
        )
    }

    /// Resolves everything a request touches, without mutating it
    ///
    /// Non-indices requests resolve to [`Resolved::local_all`]. The only
    /// error is a malformed rename expression on a snapshot restore.
    pub fn resolve_request(&self, request: &ActionRequest) -> Result<Resolved> {
        debug!(kind = ?request.kind(), "resolve aliases, indices and types");

        let state = self.cluster.state();
        let settings = self.settings();

        let mut builder = Resolved::builder();
        let mut any_leaf = false;
        self.visit_leaves(request, &mut |patterns, leaf| {
            let options = resolution_options_for(&settings, leaf);
            let resolved =
                PatternResolver::new(&state, self.remote.as_ref()).resolve(&options, leaf, patterns);
            trace!(?patterns, kind = ?leaf.kind(), "leaf resolved");
            builder.add(&resolved);
            any_leaf = true;
        })?;

        if !any_leaf {
            return Ok(Resolved::local_all());
        }
        Ok(builder.build())
    }

    /// Rewrites the request's patterns to the given replacement set
    ///
    /// In retain mode each leaf keeps only the subset of its own resolved
    /// indices that matches a replacement pattern; remote-qualified names are
    /// re-appended without filtering. Otherwise every rewritable leaf gets
    /// the replacement set verbatim. Returns whether every leaf was handled.
    pub fn replace(
        &self,
        request: &mut ActionRequest,
        retain_mode: bool,
        replacements: &[String],
    ) -> Result<bool> {
        let state = self.cluster.state();
        let settings = self.settings();

        let mut provider = |original: &[String], leaf: &LeafView<'_>, supports_replace: bool| {
            if !supports_replace {
                return Provided::Noop;
            }
            if retain_mode && !is_all_with_no_remote(original) {
                let options = resolution_options_for(&settings, leaf);
                let resolved = PatternResolver::new(&state, self.remote.as_ref())
                    .resolve(&options, leaf, original);
                let mut retained = matcher::retain_matching(resolved.all_indices(), replacements);
                retained.extend(resolved.remote_indices().iter().cloned());
                Provided::Patterns(retained)
            } else {
                Provided::Patterns(replacements.to_vec())
            }
        };

        self.apply(request, &mut provider, false)
    }

    /// Walks the request and lets the provider rewrite each leaf
    ///
    /// Batch shapes recurse into their children with `allow_empty == false`
    /// and AND their per-child outcomes. Returns `false` when any leaf was
    /// left unhandled, either because the provider answered [`Provided::Noop`]
    /// or because the answer failed shape validation.
    pub fn apply(
        &self,
        request: &mut ActionRequest,
        provider: &mut PatternProvider<'_>,
        allow_empty: bool,
    ) -> Result<bool> {
        trace!(kind = ?request.kind(), "dispatch request");

        match request {
            ActionRequest::Bulk(bulk) => {
                let mut result = true;
                for child in &mut bulk.requests {
                    result &= apply_doc_write(child, provider, false);
                }
                Ok(result)
            }
            ActionRequest::MultiGet(mget) => {
                let mut result = true;
                for item in &mut mget.items {
                    result &= apply_get_item(item, provider, false);
                }
                Ok(result)
            }
            ActionRequest::MultiSearch(msearch) => {
                let mut result = true;
                for child in &mut msearch.requests {
                    result &= apply_search(child, provider, false);
                }
                Ok(result)
            }
            ActionRequest::MultiTermVectors(mtv) => {
                let mut result = true;
                for child in &mut mtv.requests {
                    result &= apply_term_vectors(child, provider, false);
                }
                Ok(result)
            }
            ActionRequest::Aliases(aliases) => {
                let mut result = true;
                for action in &mut aliases.actions {
                    result &= apply_alias_action(action, provider, false);
                }
                Ok(result)
            }
            ActionRequest::Reindex(reindex) => {
                let mut result = apply_doc_write(&mut reindex.destination, provider, false);
                result &= apply_search(&mut reindex.source, provider, false);
                Ok(result)
            }
            ActionRequest::Search(search) => Ok(apply_search(search, provider, allow_empty)),
            ActionRequest::FieldCaps(caps) => Ok(apply_field_caps(caps, provider, allow_empty)),
            ActionRequest::Get(get) => Ok(apply_get(get, provider, allow_empty)),
            ActionRequest::TermVectors(tvr) => Ok(apply_term_vectors(tvr, provider, allow_empty)),
            ActionRequest::DocWrite(write) => Ok(apply_doc_write(write, provider, allow_empty)),
            ActionRequest::CreateIndex(create) => {
                Ok(apply_create_index(create, provider, allow_empty))
            }
            ActionRequest::Replication(repl) => Ok(apply_replication(repl, provider, allow_empty)),
            ActionRequest::PutMapping(mapping) => {
                Ok(apply_put_mapping(mapping, provider, allow_empty))
            }
            ActionRequest::Replaceable(repl) => Ok(apply_replaceable(repl, provider, allow_empty)),
            ActionRequest::BulkShard(shard) => {
                // consulted for resolution bookkeeping, never rewritten
                let patterns = shard.indices.clone();
                provider(&patterns, &LeafView::BulkShard(&*shard), false);
                Ok(true)
            }
            ActionRequest::RestoreSnapshot(restore) => {
                match self.restore_targets(restore)? {
                    Some(targets) => {
                        provider(&targets, &LeafView::RestoreSnapshot(&*restore), false);
                    }
                    None => {
                        trace!("not the elected master, restore resolution skipped");
                    }
                }
                Ok(true)
            }
            ActionRequest::ClearScroll
            | ActionRequest::SearchScroll
            | ActionRequest::Nodes
            | ActionRequest::Main => Ok(true),
            ActionRequest::Unknown(action) => {
                debug!(action, "not supported for request pattern rewriting");
                Ok(false)
            }
        }
    }

    fn visit_leaves(&self, request: &ActionRequest, on_leaf: &mut LeafVisitor<'_>) -> Result<()> {
        match request {
            ActionRequest::Bulk(bulk) => {
                for child in &bulk.requests {
                    let view = LeafView::DocWrite(child);
                    on_leaf(&view.current_patterns(), &view);
                }
            }
            ActionRequest::MultiGet(mget) => {
                for item in &mget.items {
                    let view = LeafView::GetItem(item);
                    on_leaf(&view.current_patterns(), &view);
                }
            }
            ActionRequest::MultiSearch(msearch) => {
                for child in &msearch.requests {
                    let view = LeafView::Search(child);
                    on_leaf(&view.current_patterns(), &view);
                }
            }
            ActionRequest::MultiTermVectors(mtv) => {
                for child in &mtv.requests {
                    let view = LeafView::TermVectors(child);
                    on_leaf(&view.current_patterns(), &view);
                }
            }
            ActionRequest::Aliases(aliases) => {
                for action in &aliases.actions {
                    let view = LeafView::AliasAction(action);
                    on_leaf(&view.current_patterns(), &view);
                }
            }
            ActionRequest::Reindex(reindex) => {
                let destination = LeafView::DocWrite(&reindex.destination);
                on_leaf(&destination.current_patterns(), &destination);
                let source = LeafView::Search(&reindex.source);
                on_leaf(&source.current_patterns(), &source);
            }
            ActionRequest::Search(search) => {
                let view = LeafView::Search(search);
                on_leaf(&view.current_patterns(), &view);
            }
            ActionRequest::FieldCaps(caps) => {
                let view = LeafView::FieldCaps(caps);
                on_leaf(&view.current_patterns(), &view);
            }
            ActionRequest::Get(get) => {
                let view = LeafView::Get(get);
                on_leaf(&view.current_patterns(), &view);
            }
            ActionRequest::TermVectors(tvr) => {
                let view = LeafView::TermVectors(tvr);
                on_leaf(&view.current_patterns(), &view);
            }
            ActionRequest::DocWrite(write) => {
                let view = LeafView::DocWrite(write);
                on_leaf(&view.current_patterns(), &view);
            }
            ActionRequest::CreateIndex(create) => {
                let view = LeafView::CreateIndex(create);
                on_leaf(&view.current_patterns(), &view);
            }
            ActionRequest::Replication(repl) => {
                let view = LeafView::Replication(repl);
                on_leaf(&view.current_patterns(), &view);
            }
            ActionRequest::PutMapping(mapping) => {
                let view = LeafView::PutMapping(mapping);
                on_leaf(&view.current_patterns(), &view);
            }
            ActionRequest::Replaceable(repl) => {
                let view = LeafView::Replaceable(repl);
                on_leaf(&view.current_patterns(), &view);
            }
            ActionRequest::BulkShard(shard) => {
                let view = LeafView::BulkShard(shard);
                on_leaf(&view.current_patterns(), &view);
            }
            ActionRequest::RestoreSnapshot(restore) => {
                if let Some(targets) = self.restore_targets(restore)? {
                    on_leaf(&targets, &LeafView::RestoreSnapshot(restore));
                }
            }
            ActionRequest::ClearScroll
            | ActionRequest::SearchScroll
            | ActionRequest::Nodes
            | ActionRequest::Main => {}
            ActionRequest::Unknown(action) => {
                debug!(action, "not supported for pattern resolution");
            }
        }
        Ok(())
    }

    /// Computes the live index names a restore would create
    ///
    /// `None` means this node is known not to be the elected master and the
    /// request is left to the master to resolve. A snapshot missing from the
    /// catalog widens to everything rather than failing here.
    fn restore_targets(&self, request: &RestoreSnapshotRequest) -> Result<Option<Vec<String>>> {
        if self.cluster.is_local_node_elected_master() == Some(false) {
            return Ok(None);
        }

        let Some(info) = self
            .snapshots
            .snapshot_info(&request.repository, &request.snapshot)
        else {
            warn!(
                repository = %request.repository,
                snapshot = %request.snapshot,
                "snapshot not found in repository"
            );
            return Ok(Some(vec![ALL_PATTERN.to_string()]));
        };

        let options = request.options.unwrap_or_default();
        let filtered = filter_indices(&info.indices, &request.indices, &options);
        let renamed = renamed_indices(request, &filtered)?;
        debug!(snapshot = %info.name, ?renamed, "snapshot restore touches these indices");
        Ok(Some(renamed))
    }
}

fn resolution_options_for(settings: &DynamicSettings, leaf: &LeafView<'_>) -> ResolutionOptions {
    if settings.respect_request_resolution_options {
        leaf.resolution_options().unwrap_or_default()
    } else {
        ResolutionOptions::lenient_expand_open()
    }
}

/// Validates a provider answer against the leaf's shape constraints
fn checked(
    kind: RequestKind,
    provided: Provided,
    needs_one: bool,
    allow_empty: bool,
) -> Option<Vec<String>> {
    match provided {
        Provided::Noop => None,
        Provided::Patterns(patterns) => {
            if !allow_empty && patterns.is_empty() {
                trace!(?kind, "empty replacement pattern list, rejected");
                None
            } else if !allow_empty && needs_one && patterns.len() != 1 {
                trace!(
                    ?kind,
                    count = patterns.len(),
                    "shape takes exactly one index, rejected"
                );
                None
            } else if patterns.iter().any(|p| p.is_empty()) {
                trace!(?kind, "blank pattern, rejected");
                None
            } else {
                Some(patterns)
            }
        }
    }
}

fn single(mut patterns: Vec<String>) -> Option<String> {
    if patterns.len() == 1 {
        Some(patterns.remove(0))
    } else {
        None
    }
}

fn apply_search(
    request: &mut SearchRequest,
    provider: &mut PatternProvider<'_>,
    allow_empty: bool,
) -> bool {
    let view = LeafView::Search(&*request);
    let provided = provider(&view.current_patterns(), &view, true);
    match checked(RequestKind::Search, provided, false, allow_empty) {
        Some(patterns) => {
            request.indices = patterns;
            true
        }
        None => false,
    }
}

fn apply_field_caps(
    request: &mut FieldCapsRequest,
    provider: &mut PatternProvider<'_>,
    allow_empty: bool,
) -> bool {
    let view = LeafView::FieldCaps(&*request);
    let provided = provider(&view.current_patterns(), &view, true);
    match checked(RequestKind::FieldCaps, provided, false, allow_empty) {
        Some(patterns) => {
            request.indices = patterns;
            true
        }
        None => false,
    }
}

fn apply_replaceable(
    request: &mut ReplaceableRequest,
    provider: &mut PatternProvider<'_>,
    allow_empty: bool,
) -> bool {
    let view = LeafView::Replaceable(&*request);
    let provided = provider(&view.current_patterns(), &view, true);
    match checked(RequestKind::Replaceable, provided, false, allow_empty) {
        Some(patterns) => {
            request.indices = patterns;
            true
        }
        None => false,
    }
}

fn apply_alias_action(
    action: &mut AliasAction,
    provider: &mut PatternProvider<'_>,
    allow_empty: bool,
) -> bool {
    let view = LeafView::AliasAction(&*action);
    let provided = provider(&view.current_patterns(), &view, true);
    match checked(RequestKind::AliasAction, provided, false, allow_empty) {
        Some(patterns) => {
            action.indices = patterns;
            true
        }
        None => false,
    }
}

fn apply_get(request: &mut GetRequest, provider: &mut PatternProvider<'_>, allow_empty: bool) -> bool {
    let view = LeafView::Get(&*request);
    let provided = provider(&view.current_patterns(), &view, true);
    match checked(RequestKind::Get, provided, true, allow_empty) {
        Some(patterns) => {
            request.index = single(patterns);
            request.indices.clear();
            true
        }
        None => false,
    }
}

fn apply_doc_write(
    request: &mut DocWriteRequest,
    provider: &mut PatternProvider<'_>,
    allow_empty: bool,
) -> bool {
    let view = LeafView::DocWrite(&*request);
    let provided = provider(&view.current_patterns(), &view, true);
    match checked(RequestKind::DocWrite, provided, true, allow_empty) {
        Some(patterns) => {
            request.index = single(patterns);
            true
        }
        None => false,
    }
}

fn apply_get_item(item: &mut GetItem, provider: &mut PatternProvider<'_>, allow_empty: bool) -> bool {
    let view = LeafView::GetItem(&*item);
    let provided = provider(&view.current_patterns(), &view, true);
    match checked(RequestKind::MultiGetItem, provided, true, allow_empty) {
        Some(patterns) => {
            item.index = single(patterns);
            true
        }
        None => false,
    }
}

fn apply_term_vectors(
    request: &mut TermVectorsRequest,
    provider: &mut PatternProvider<'_>,
    allow_empty: bool,
) -> bool {
    let view = LeafView::TermVectors(&*request);
    let provided = provider(&view.current_patterns(), &view, true);
    match checked(RequestKind::TermVectors, provided, true, allow_empty) {
        Some(patterns) => {
            request.index = single(patterns);
            true
        }
        None => false,
    }
}

fn apply_create_index(
    request: &mut CreateIndexRequest,
    provider: &mut PatternProvider<'_>,
    allow_empty: bool,
) -> bool {
    let view = LeafView::CreateIndex(&*request);
    let provided = provider(&view.current_patterns(), &view, true);
    match checked(RequestKind::CreateIndex, provided, true, allow_empty) {
        Some(patterns) => {
            request.index = single(patterns);
            true
        }
        None => false,
    }
}

fn apply_replication(
    request: &mut ReplicationRequest,
    provider: &mut PatternProvider<'_>,
    allow_empty: bool,
) -> bool {
    let view = LeafView::Replication(&*request);
    let provided = provider(&view.current_patterns(), &view, true);
    match checked(RequestKind::Replication, provided, true, allow_empty) {
        Some(patterns) => {
            request.index = single(patterns);
            true
        }
        None => false,
    }
}

fn apply_put_mapping(
    request: &mut PutMappingRequest,
    provider: &mut PatternProvider<'_>,
    allow_empty: bool,
) -> bool {
    let concrete = request.concrete_index.clone();
    if let (Some(concrete), true) = (concrete, request.indices.is_empty()) {
        // arrived pre-resolved to one concrete index; rewrite it as a
        // one-element pattern list
        let current = vec![concrete];
        let provided = provider(&current, &LeafView::PutMapping(&*request), true);
        match checked(RequestKind::PutMapping, provided, true, allow_empty) {
            Some(patterns) => {
                request.indices = patterns;
                request.concrete_index = None;
                true
            }
            None => false,
        }
    } else {
        let view = LeafView::PutMapping(&*request);
        let provided = provider(&view.current_patterns(), &view, true);
        match checked(RequestKind::PutMapping, provided, false, allow_empty) {
            Some(patterns) => {
                request.indices = patterns;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ClusterState, InMemoryClusterStateProvider};
    use crate::request::{
        AliasActionKind, AliasesRequest, BulkRequest, DocWriteOp, MultiGetRequest,
        MultiSearchRequest,
    };
    use crate::resolve::remote::StaticRemoteClusters;
    use crate::snapshot::{InMemorySnapshotRepository, SnapshotInfo};

    fn state() -> ClusterState {
        ClusterState::builder()
            .index("app-1")
            .index("app-2")
            .index("secret-1")
            .alias("events", ["app-1", "app-2"])
            .build()
    }

    fn replacer() -> IndexResolverReplacer {
        IndexResolverReplacer::new(
            Arc::new(InMemoryClusterStateProvider::new(state())),
            Arc::new(StaticRemoteClusters::disabled()),
            Arc::new(InMemorySnapshotRepository::new()),
        )
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_replace_search_verbatim() {
        let replacer = replacer();
        let mut request = ActionRequest::Search(SearchRequest::new(["*"]));

        let handled = replacer
            .replace(&mut request, false, &strings(&["app-1", "app-2"]))
            .unwrap();
        assert!(handled);
        match request {
            ActionRequest::Search(search) => {
                assert_eq!(search.indices, strings(&["app-1", "app-2"]))
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_replace_retain_mode_intersects() {
        let replacer = replacer();
        let mut request = ActionRequest::Search(SearchRequest::new(["app-*", "secret-*"]));

        let handled = replacer
            .replace(&mut request, true, &strings(&["app-*"]))
            .unwrap();
        assert!(handled);
        match request {
            ActionRequest::Search(search) => {
                assert_eq!(search.indices, strings(&["app-1", "app-2"]))
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_replace_retain_mode_leaves_all_request_verbatim() {
        let replacer = replacer();
        let mut request = ActionRequest::Search(SearchRequest::new(["*"]));

        replacer
            .replace(&mut request, true, &strings(&["app-*"]))
            .unwrap();
        match request {
            ActionRequest::Search(search) => assert_eq!(search.indices, strings(&["app-*"])),
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_single_index_shape_rejects_multiple_replacements() {
        let replacer = replacer();
        let mut request =
            ActionRequest::DocWrite(DocWriteRequest::new(DocWriteOp::Index, "app-1"));

        let handled = replacer
            .replace(&mut request, false, &strings(&["app-1", "app-2"]))
            .unwrap();
        assert!(!handled);
        match request {
            ActionRequest::DocWrite(write) => assert_eq!(write.index.as_deref(), Some("app-1")),
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_blank_replacement_rejected() {
        let replacer = replacer();
        let mut request = ActionRequest::Search(SearchRequest::new(["app-1"]));

        let handled = replacer
            .replace(&mut request, false, &strings(&["app-1", ""]))
            .unwrap();
        assert!(!handled);
    }

    #[test]
    fn test_bulk_rewrites_every_child() {
        let replacer = replacer();
        let mut request = ActionRequest::Bulk(BulkRequest {
            requests: vec![
                DocWriteRequest::new(DocWriteOp::Index, "app-1"),
                DocWriteRequest::new(DocWriteOp::Delete, "app-2"),
            ],
        });

        let handled = replacer
            .replace(&mut request, false, &strings(&["other"]))
            .unwrap();
        assert!(handled);
        match request {
            ActionRequest::Bulk(bulk) => {
                for child in &bulk.requests {
                    assert_eq!(child.index.as_deref(), Some("other"));
                }
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_bulk_failure_is_sticky() {
        let replacer = replacer();
        let mut request = ActionRequest::Bulk(BulkRequest {
            requests: vec![
                DocWriteRequest::new(DocWriteOp::Index, "app-1"),
                DocWriteRequest::new(DocWriteOp::Index, "app-2"),
            ],
        });

        // two replacements cannot land on single-index children
        let handled = replacer
            .replace(&mut request, false, &strings(&["a", "b"]))
            .unwrap();
        assert!(!handled);
    }

    #[test]
    fn test_multi_search_children_rewritten_independently() {
        let replacer = replacer();
        let mut request = ActionRequest::MultiSearch(MultiSearchRequest {
            requests: vec![SearchRequest::new(["app-1"]), SearchRequest::new(["app-2"])],
        });

        let handled = replacer
            .replace(&mut request, false, &strings(&["granted-*"]))
            .unwrap();
        assert!(handled);
        match request {
            ActionRequest::MultiSearch(msearch) => {
                for child in &msearch.requests {
                    assert_eq!(child.indices, strings(&["granted-*"]));
                }
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_alias_actions_rewritten() {
        let replacer = replacer();
        let mut request = ActionRequest::Aliases(AliasesRequest {
            actions: vec![AliasAction::new(AliasActionKind::Add, ["app-*"])],
        });

        let handled = replacer
            .replace(&mut request, false, &strings(&["app-1", "app-2"]))
            .unwrap();
        assert!(handled);
        match request {
            ActionRequest::Aliases(aliases) => {
                assert_eq!(aliases.actions[0].indices, strings(&["app-1", "app-2"]))
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_get_collapses_split_fields() {
        let replacer = replacer();
        let mut request = ActionRequest::Get(GetRequest {
            index: Some("app-1".to_string()),
            indices: vec!["app-2".to_string()],
            doc_type: None,
        });

        let handled = replacer
            .replace(&mut request, false, &strings(&["granted"]))
            .unwrap();
        assert!(handled);
        match request {
            ActionRequest::Get(get) => {
                assert_eq!(get.index.as_deref(), Some("granted"));
                assert!(get.indices.is_empty());
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_put_mapping_concrete_index_rewritten_as_pattern_list() {
        let replacer = replacer();
        let mut request = ActionRequest::PutMapping(PutMappingRequest {
            concrete_index: Some("app-1".to_string()),
            indices: vec![],
            doc_type: None,
        });

        let handled = replacer
            .replace(&mut request, false, &strings(&["app-1"]))
            .unwrap();
        assert!(handled);
        match request {
            ActionRequest::PutMapping(mapping) => {
                assert_eq!(mapping.indices, strings(&["app-1"]));
                assert!(mapping.concrete_index.is_none());
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_bulk_shard_is_never_rewritten() {
        let replacer = replacer();
        let mut request = ActionRequest::BulkShard(crate::request::BulkShardRequest {
            indices: strings(&["app-1"]),
            items: vec![],
        });

        let handled = replacer
            .replace(&mut request, false, &strings(&["other"]))
            .unwrap();
        assert!(handled);
        match request {
            ActionRequest::BulkShard(shard) => assert_eq!(shard.indices, strings(&["app-1"])),
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_unknown_shape_reports_unhandled() {
        let replacer = replacer();
        let mut request = ActionRequest::Unknown("cluster:monitor/stats".to_string());

        let handled = replacer
            .replace(&mut request, false, &strings(&["app-1"]))
            .unwrap();
        assert!(!handled);
    }

    #[test]
    fn test_non_indices_requests_resolve_to_local_all() {
        let replacer = replacer();

        for request in [
            ActionRequest::ClearScroll,
            ActionRequest::SearchScroll,
            ActionRequest::Nodes,
            ActionRequest::Main,
            ActionRequest::Unknown("internal:ping".to_string()),
        ] {
            let resolved = replacer.resolve_request(&request).unwrap();
            assert_eq!(resolved, Resolved::local_all(), "{request:?}");
        }
    }

    #[test]
    fn test_is_indices_request() {
        assert!(IndexResolverReplacer::is_indices_request(
            &ActionRequest::Search(SearchRequest::new(["a"]))
        ));
        assert!(!IndexResolverReplacer::is_indices_request(
            &ActionRequest::Main
        ));
        assert!(!IndexResolverReplacer::is_indices_request(
            &ActionRequest::Unknown("x".to_string())
        ));
    }

    #[test]
    fn test_settings_snapshot_versioning() {
        let replacer = replacer();
        assert_eq!(replacer.settings().version, 0);

        replacer.on_settings_change(DynamicSettings {
            respect_request_resolution_options: true,
            ..Default::default()
        });
        let snapshot = replacer.settings();
        assert_eq!(snapshot.version, 1);
        assert!(snapshot.respect_request_resolution_options);

        replacer.on_settings_change(DynamicSettings::default());
        assert_eq!(replacer.settings().version, 2);
    }

    #[test]
    fn test_restore_skipped_on_non_master() {
        let provider =
            InMemoryClusterStateProvider::new(state()).with_elected_master(Some(false));
        let replacer = IndexResolverReplacer::new(
            Arc::new(provider),
            Arc::new(StaticRemoteClusters::disabled()),
            Arc::new(InMemorySnapshotRepository::new()),
        );

        let request = ActionRequest::RestoreSnapshot(RestoreSnapshotRequest {
            repository: "backups".to_string(),
            snapshot: "nightly".to_string(),
            ..Default::default()
        });

        let resolved = replacer.resolve_request(&request).unwrap();
        assert_eq!(resolved, Resolved::local_all());
    }

    #[test]
    fn test_restore_resolves_renamed_targets() {
        let snapshots = InMemorySnapshotRepository::new();
        snapshots.add("backups", SnapshotInfo::new("nightly", ["app-1", "app-2"]));
        let replacer = IndexResolverReplacer::new(
            Arc::new(InMemoryClusterStateProvider::new(state())),
            Arc::new(StaticRemoteClusters::disabled()),
            Arc::new(snapshots),
        );

        let request = ActionRequest::RestoreSnapshot(RestoreSnapshotRequest {
            repository: "backups".to_string(),
            snapshot: "nightly".to_string(),
            indices: strings(&["app-*"]),
            rename_pattern: Some("app-(.+)".to_string()),
            rename_replacement: Some("restored-$1".to_string()),
            options: None,
        });

        let resolved = replacer.resolve_request(&request).unwrap();
        assert!(resolved.all_indices().contains("restored-1"));
        assert!(resolved.all_indices().contains("restored-2"));
    }

    #[test]
    fn test_restore_invalid_rename_is_fatal() {
        let snapshots = InMemorySnapshotRepository::new();
        snapshots.add("backups", SnapshotInfo::new("nightly", ["app-1"]));
        let replacer = IndexResolverReplacer::new(
            Arc::new(InMemoryClusterStateProvider::new(state())),
            Arc::new(StaticRemoteClusters::disabled()),
            Arc::new(snapshots),
        );

        let request = ActionRequest::RestoreSnapshot(RestoreSnapshotRequest {
            repository: "backups".to_string(),
            snapshot: "nightly".to_string(),
            rename_pattern: Some("(bad".to_string()),
            rename_replacement: Some("x".to_string()),
            ..Default::default()
        });

        assert!(replacer.resolve_request(&request).is_err());
    }

    #[test]
    fn test_restore_missing_snapshot_widens_to_everything() {
        let replacer = replacer();
        let request = ActionRequest::RestoreSnapshot(RestoreSnapshotRequest {
            repository: "backups".to_string(),
            snapshot: "gone".to_string(),
            ..Default::default()
        });

        let resolved = replacer.resolve_request(&request).unwrap();
        assert!(resolved.is_local_all());
    }

    #[test]
    fn test_resolve_multi_get_accumulates_items() {
        let replacer = replacer();
        let request = ActionRequest::MultiGet(MultiGetRequest {
            items: vec![
                GetItem::new("app-1"),
                GetItem::new("app-2"),
                GetItem::new("unlisted"),
            ],
        });

        let resolved = replacer.resolve_request(&request).unwrap();
        assert!(resolved.all_indices().contains("app-1"));
        assert!(resolved.all_indices().contains("app-2"));
        assert!(resolved.all_indices().contains("unlisted"));
        assert_eq!(resolved.original_requested().len(), 3);
    }

    #[test]
    fn test_request_options_ignored_unless_respected() {
        use crate::metadata::IndexState;

        let state = ClusterState::builder()
            .index("app-1")
            .index_with_state("app-archived", IndexState::Closed)
            .build();
        let replacer = IndexResolverReplacer::new(
            Arc::new(InMemoryClusterStateProvider::new(state)),
            Arc::new(StaticRemoteClusters::disabled()),
            Arc::new(InMemorySnapshotRepository::new()),
        );

        let mut search = SearchRequest::new(["app-*"]);
        search.options = Some(ResolutionOptions::lenient_expand_all());
        let request = ActionRequest::Search(search);

        // default settings force the conservative option set, which does not
        // expand wildcards to closed indices
        let resolved = replacer.resolve_request(&request).unwrap();
        assert!(resolved.all_indices().contains("app-1"));
        assert!(!resolved.all_indices().contains("app-archived"));

        replacer.on_settings_change(DynamicSettings {
            respect_request_resolution_options: true,
            ..Default::default()
        });
        let resolved = replacer.resolve_request(&request).unwrap();
        assert!(resolved.all_indices().contains("app-archived"));
    }
}
