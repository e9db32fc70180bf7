//! # SearchSec Resolver Module
//!
//! This module implements the index and alias resolution engine of the
//! search security layer.
//!
//! ## Features
//!
//! - **Pattern Resolution**: Wildcard, alias and date-math resolution against
//!   point-in-time cluster metadata snapshots
//! - **Request Rewriting**: Authorization-driven replacement of the resource
//!   patterns carried by data-access requests
//! - **Cross-Cluster Awareness**: Remote-qualified patterns are split off and
//!   preserved verbatim
//! - **Snapshot Restore**: Restore requests resolve against snapshot content,
//!   including index renaming
//! - **Dynamic Settings**: Versioned, atomically swapped configuration
//!   snapshots
//!
//! ## Module Structure
//!
//! ```text
//! searchsec-resolver/
//! ├── matcher/       - Wildcard pattern matching primitives
//! ├── metadata/      - Cluster state snapshots and date-math
//! ├── request/       - Recognized request shapes and leaf views
//! ├── resolve/       - Resolution, remote splitting and rewriting
//! ├── settings/      - Dynamic resolver configuration
//! └── snapshot/      - Snapshot catalog and restore targets
//! ```

pub mod error;
pub mod matcher;
pub mod metadata;
pub mod request;
pub mod resolve;
pub mod settings;
pub mod snapshot;
pub mod types;

pub use error::{ResolverError, Result};
pub use resolve::{IndexResolverReplacer, Provided, Resolved, StaticRemoteClusters};
pub use settings::DynamicSettings;
pub use types::{RequestKind, ResolutionOptions};
