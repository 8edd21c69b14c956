//! Configuration for script service module

use serde::Deserialize;

/// Script service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Batches larger than this are rejected before any operation runs
    #[serde(default = "default_max_operations_per_batch")]
    pub max_operations_per_batch: usize,

    /// Resolve unknown temp ids by their embedded timestamp digits
    #[serde(default = "default_true")]
    pub temp_id_fragment_fallback: bool,

    /// Publish change events after a commit
    #[serde(default = "default_true")]
    pub publish_events: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_operations_per_batch: default_max_operations_per_batch(),
            temp_id_fragment_fallback: true,
            publish_events: true,
        }
    }
}

fn default_max_operations_per_batch() -> usize {
    500
}

fn default_true() -> bool {
    true
}
