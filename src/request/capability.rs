//! Per-shape type-qualifier capability table
//!
//! A handful of shapes have dedicated type accessors; for everything else
//! the resolver consults this table to learn whether the shape carries a
//! single type, a type array, or nothing. The table is process-wide and
//! shared across concurrently executing requests; inserts are idempotent, so
//! two threads computing the same entry is harmless.

use std::sync::OnceLock;

use dashmap::DashMap;

use crate::types::RequestKind;

/// Whether a shape exposes legacy type qualifiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeCapability {
    /// Shape has a single-type field
    pub single: bool,
    /// Shape has a type-array field
    pub multi: bool,
}

impl TypeCapability {
    pub const NONE: TypeCapability = TypeCapability {
        single: false,
        multi: false,
    };
    pub const SINGLE: TypeCapability = TypeCapability {
        single: true,
        multi: false,
    };
    pub const MULTI: TypeCapability = TypeCapability {
        single: false,
        multi: true,
    };
}

fn table() -> &'static DashMap<RequestKind, TypeCapability> {
    static TABLE: OnceLock<DashMap<RequestKind, TypeCapability>> = OnceLock::new();
    TABLE.get_or_init(DashMap::new)
}

/// Looks up the type capability of a shape, caching the answer
pub fn type_capability(kind: RequestKind) -> TypeCapability {
    if let Some(entry) = table().get(&kind) {
        return *entry;
    }

    let capability = compute(kind);
    table().insert(kind, capability);
    capability
}

fn compute(kind: RequestKind) -> TypeCapability {
    match kind {
        RequestKind::Get
        | RequestKind::DocWrite
        | RequestKind::TermVectors
        | RequestKind::MultiGetItem
        | RequestKind::PutMapping => TypeCapability::SINGLE,
        RequestKind::Search | RequestKind::BulkShard => TypeCapability::MULTI,
        _ => TypeCapability::NONE,
    }
}
