//! Error types for the resolver engine

use thiserror::Error;

/// Resolver engine errors
///
/// Almost everything that can go wrong during resolution is recovered
/// locally (unsupported request shapes, missing indices) and never surfaces
/// here. The only caller-visible failure is a malformed rename expression on
/// a snapshot restore request.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The `rename_pattern` supplied with a restore request is not a valid
    /// regular expression
    #[error("invalid rename pattern '{pattern}': {source}")]
    InvalidRenamePattern {
        /// The offending pattern, verbatim
        pattern: String,
        /// Underlying regex parse failure
        #[source]
        source: Box<regex::Error>,
    },
}

/// Result type for resolver operations
pub type Result<T> = std::result::Result<T, ResolverError>;
