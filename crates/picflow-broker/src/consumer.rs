//! Status-queue consumer.
//!
//! A single `BRPOP` loop with a semaphore bounding concurrent in-flight
//! deliveries to the configured prefetch count. Deliveries are
//! acknowledged by receipt: once popped, a message is gone from the
//! broker, so the handler must never lose it silently.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::{watch, Semaphore};
use tracing::{info, warn};

use picflow_core::config::broker::BrokerConfig;
use picflow_core::error::{AppError, ErrorKind};
use picflow_core::result::AppResult;

use crate::bindings::STATUS_QUEUE;

/// Handles one delivery from the status queue.
///
/// Implementations must swallow their own failures (log and drop):
/// a poison message must never stall the consume loop, and there is no
/// redelivery once a message has been popped.
#[async_trait]
pub trait MessageHandler: Send + Sync + 'static {
    async fn handle(&self, payload: Vec<u8>);
}

/// Long-running consumer of the shared status queue.
pub struct StatusConsumer {
    connection: ConnectionManager,
    handler: Arc<dyn MessageHandler>,
    prefetch: Arc<Semaphore>,
    poll_timeout: Duration,
}

impl StatusConsumer {
    /// Connect to the broker and build a consumer around `handler`.
    pub async fn connect(config: &BrokerConfig, handler: Arc<dyn MessageHandler>) -> AppResult<Self> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| AppError::with_source(ErrorKind::Configuration, "Invalid broker URL", e))?;
        let connection = ConnectionManager::new(client).await.map_err(|e| {
            AppError::with_source(ErrorKind::Infrastructure, "Failed to connect to broker", e)
        })?;

        Ok(Self {
            connection,
            handler,
            prefetch: Arc::new(Semaphore::new(usize::from(config.prefetch_count))),
            poll_timeout: Duration::from_secs(config.consume_poll_timeout_seconds),
        })
    }

    /// Run the consume loop until `shutdown` flips to `true`.
    ///
    /// In-flight handlers are given until their permit drops; the loop
    /// itself stops accepting new deliveries immediately.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(queue = STATUS_QUEUE.queue_name, "Status consumer started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            // Acquire before popping so at most `prefetch` deliveries
            // are in flight; the popped message keeps the permit.
            let permit = match self.prefetch.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };

            let popped: Result<Option<(String, Vec<u8>)>, redis::RedisError> = tokio::select! {
                result = self
                    .connection
                    .brpop(STATUS_QUEUE.queue_name, self.poll_timeout.as_secs_f64()) => result,
                _ = shutdown.changed() => {
                    drop(permit);
                    continue;
                }
            };

            match popped {
                Ok(Some((_, payload))) => {
                    let handler = Arc::clone(&self.handler);
                    tokio::spawn(async move {
                        handler.handle(payload).await;
                        drop(permit);
                    });
                }
                Ok(None) => {
                    // Poll timeout elapsed with an empty queue.
                    drop(permit);
                }
                Err(e) => {
                    drop(permit);
                    warn!(error = %e, "Status-queue poll failed; backing off");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }

        info!("Status consumer stopped");
    }
}

impl std::fmt::Debug for StatusConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusConsumer")
            .field("queue", &STATUS_QUEUE.queue_name)
            .field("poll_timeout", &self.poll_timeout)
            .finish_non_exhaustive()
    }
}
