//! Notification bus and realtime delivery configuration.

use serde::{Deserialize, Serialize};

/// Realtime delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Bus transport: `"memory"` (single node) or `"redis"` (multi node).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Redis URL for the `"redis"` transport.
    #[serde(default)]
    pub redis_url: String,
    /// Capacity of the in-process broadcast fan-out. A subscriber that
    /// lags past this many envelopes is closed with an error.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            redis_url: String::new(),
            buffer_size: default_buffer_size(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_buffer_size() -> usize {
    256
}
