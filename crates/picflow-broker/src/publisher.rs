//! Redis-list backed queue publisher.
//!
//! Publishes are a single `LPUSH` wrapped in a bounded timeout so a
//! stalled broker surfaces as a routing failure instead of hanging the
//! request path.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::info;

use picflow_core::config::broker::BrokerConfig;
use picflow_core::error::{AppError, ErrorKind};
use picflow_core::result::AppResult;
use picflow_core::traits::QueuePublisher;

/// Queue publisher over a Redis connection manager.
///
/// The connection manager reconnects transparently; a publish that
/// cannot complete within the configured timeout fails instead of
/// queueing behind the reconnect.
#[derive(Clone)]
pub struct RedisQueuePublisher {
    connection: ConnectionManager,
    publish_timeout: Duration,
}

impl RedisQueuePublisher {
    /// Connect to the broker and build a publisher.
    pub async fn connect(config: &BrokerConfig) -> AppResult<Self> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| AppError::with_source(ErrorKind::Configuration, "Invalid broker URL", e))?;
        let connection = ConnectionManager::new(client).await.map_err(|e| {
            AppError::with_source(ErrorKind::Infrastructure, "Failed to connect to broker", e)
        })?;

        info!("Connected queue publisher to broker");

        Ok(Self {
            connection,
            publish_timeout: Duration::from_secs(config.publish_timeout_seconds),
        })
    }
}

impl fmt::Debug for RedisQueuePublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisQueuePublisher")
            .field("publish_timeout", &self.publish_timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl QueuePublisher for RedisQueuePublisher {
    async fn publish(&self, queue: &str, payload: &[u8]) -> AppResult<()> {
        let mut connection = self.connection.clone();
        let push = connection.lpush::<_, _, ()>(queue, payload);

        match tokio::time::timeout(self.publish_timeout, push).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(AppError::with_source(
                ErrorKind::RoutingFailure,
                format!("Publish to '{queue}' failed"),
                e,
            )),
            Err(_) => Err(AppError::routing_failure(format!(
                "Publish to '{queue}' timed out after {:?}",
                self.publish_timeout
            ))),
        }
    }
}
