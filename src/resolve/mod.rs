//! Pattern resolution and rewriting
//!
//! `resolved` holds the aggregate result type, `remote` the cross-cluster
//! splitting, `patterns` the core resolution algorithm and `replacer` the
//! request dispatcher built on top of them.

mod patterns;
mod remote;
mod replacer;
mod resolved;

pub use remote::{
    build_remote_index_name, split_qualifier, RemoteClusterResolver, StaticRemoteClusters,
};
pub use replacer::{IndexResolverReplacer, PatternProvider, Provided};
pub use resolved::{is_all_with_no_remote, is_local_all_patterns, Builder, Resolved};
