//! Dynamic resolver configuration
//!
//! Configuration arrives asynchronously as a settings snapshot. Each update
//! produces a new immutable, versioned [`DynamicSettings`] value that the
//! resolver swaps in atomically; readers take one consistent snapshot per
//! resolution call and tolerate it changing between calls.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Dotted settings key controlling whether request-supplied resolution
/// options are honored
pub const RESPECT_REQUEST_OPTIONS_KEY: &str = "dynamic.respect_request_resolution_options";

/// Immutable snapshot of the dynamic resolver settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicSettings {
    /// Monotonic snapshot version, assigned on swap
    #[serde(default)]
    pub version: u64,
    /// Honor the leniency options carried by each request instead of the
    /// fixed conservative option set
    #[serde(default)]
    pub respect_request_resolution_options: bool,
}

impl DynamicSettings {
    /// Reads the settings out of a raw configuration document
    ///
    /// Unknown or missing keys fall back to defaults; a configuration update
    /// never fails, it can only be ignored.
    pub fn from_value(config: &Value) -> Self {
        Self {
            version: 0,
            respect_request_resolution_options: lookup_bool(config, RESPECT_REQUEST_OPTIONS_KEY)
                .unwrap_or(false),
        }
    }

    /// Returns a copy of this snapshot with the given version
    pub(crate) fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }
}

/// Resolves a dotted key path against a JSON configuration document
fn lookup_bool(config: &Value, dotted_key: &str) -> Option<bool> {
    let mut current = config;
    for segment in dotted_key.split('.') {
        current = current.get(segment)?;
    }
    current.as_bool()
}
