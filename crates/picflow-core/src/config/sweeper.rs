//! Reconciliation sweeper configuration.

use serde::{Deserialize, Serialize};

/// Settings for the orphaned-upload reconciliation sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweeperConfig {
    /// Whether the sweep runs at all. Disabled by default.
    #[serde(default)]
    pub enabled: bool,
    /// Seconds between sweep ticks.
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
    /// A record in `UPLOADING` older than this many seconds is a
    /// candidate for reconciliation.
    #[serde(default = "default_threshold")]
    pub threshold_seconds: u64,
    /// Maximum concurrent blob-store probes per tick.
    #[serde(default = "default_probe_concurrency")]
    pub probe_concurrency: usize,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_seconds: default_interval(),
            threshold_seconds: default_threshold(),
            probe_concurrency: default_probe_concurrency(),
        }
    }
}

fn default_interval() -> u64 {
    60
}

fn default_threshold() -> u64 {
    600
}

fn default_probe_concurrency() -> usize {
    8
}
