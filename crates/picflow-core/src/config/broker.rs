//! Message broker configuration.

use serde::{Deserialize, Serialize};

/// Work-queue broker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Broker connection URL.
    pub url: String,
    /// Bounded wait for broker acknowledgment of a publish, in seconds.
    #[serde(default = "default_publish_timeout")]
    pub publish_timeout_seconds: u64,
    /// Maximum unacknowledged deliveries held concurrently per queue.
    /// This is the backpressure control protecting the job store.
    #[serde(default = "default_prefetch")]
    pub prefetch_count: u16,
    /// Blocking-pop timeout for the status consumer loop, in seconds.
    #[serde(default = "default_poll_timeout")]
    pub consume_poll_timeout_seconds: u64,
}

fn default_publish_timeout() -> u64 {
    5
}

fn default_prefetch() -> u16 {
    5
}

fn default_poll_timeout() -> u64 {
    5
}
