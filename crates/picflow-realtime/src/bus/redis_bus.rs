//! Redis pub/sub notification bus for multi-node deployments.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::ConnectionManager;
use tokio::sync::broadcast;
use tracing::{info, warn};

use picflow_core::config::realtime::RealtimeConfig;
use picflow_core::error::{AppError, ErrorKind};
use picflow_core::events::{StatusEnvelope, NOTIFICATION_CHANNEL};
use picflow_core::result::AppResult;
use picflow_core::traits::NotificationBus;

/// Notification bus relayed through a single Redis pub/sub channel.
///
/// Publishes go straight to Redis; a background task holds the one
/// inbound subscription per process and fans received envelopes out to
/// local subscribers through a broadcast channel. Envelopes published
/// locally therefore also arrive via Redis, which keeps single-node and
/// multi-node delivery paths identical.
pub struct RedisNotificationBus {
    connection: ConnectionManager,
    sender: broadcast::Sender<StatusEnvelope>,
}

impl RedisNotificationBus {
    /// Connect to Redis and start the inbound relay task.
    pub async fn connect(config: &RealtimeConfig) -> AppResult<Self> {
        let client = redis::Client::open(config.redis_url.as_str())
            .map_err(|e| AppError::with_source(ErrorKind::Configuration, "Invalid Redis URL", e))?;
        let connection = ConnectionManager::new(client.clone()).await.map_err(|e| {
            AppError::with_source(ErrorKind::Infrastructure, "Failed to connect to Redis", e)
        })?;

        let (sender, _) = broadcast::channel(config.buffer_size);
        tokio::spawn(relay_inbound(client, sender.clone()));

        Ok(Self { connection, sender })
    }
}

/// Subscribe to the notification channel and fan messages into the
/// local broadcast, reconnecting with a short backoff when the pub/sub
/// connection drops.
async fn relay_inbound(client: redis::Client, sender: broadcast::Sender<StatusEnvelope>) {
    loop {
        let mut pubsub = match client.get_async_pubsub().await {
            Ok(pubsub) => pubsub,
            Err(e) => {
                warn!(error = %e, "Notification relay connect failed; retrying");
                tokio::time::sleep(Duration::from_secs(1)).await;
                continue;
            }
        };

        if let Err(e) = pubsub.subscribe(NOTIFICATION_CHANNEL).await {
            warn!(error = %e, "Notification channel subscribe failed; retrying");
            tokio::time::sleep(Duration::from_secs(1)).await;
            continue;
        }
        info!(channel = NOTIFICATION_CHANNEL, "Notification relay subscribed");

        let mut messages = pubsub.on_message();
        while let Some(msg) = messages.next().await {
            let payload: String = match msg.get_payload() {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(error = %e, "Dropping non-text notification payload");
                    continue;
                }
            };
            match serde_json::from_str::<StatusEnvelope>(&payload) {
                Ok(envelope) => {
                    let _ = sender.send(envelope);
                }
                Err(e) => {
                    warn!(error = %e, "Dropping malformed notification payload");
                }
            }
        }

        warn!("Notification relay stream ended; reconnecting");
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

impl fmt::Debug for RedisNotificationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisNotificationBus")
            .field("channel", &NOTIFICATION_CHANNEL)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl NotificationBus for RedisNotificationBus {
    async fn publish(&self, envelope: StatusEnvelope) -> AppResult<()> {
        let payload = serde_json::to_string(&envelope)?;
        let mut connection = self.connection.clone();
        redis::cmd("PUBLISH")
            .arg(NOTIFICATION_CHANNEL)
            .arg(payload)
            .query_async::<i64>(&mut connection)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Infrastructure, "Notification publish failed", e)
            })?;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StatusEnvelope> {
        self.sender.subscribe()
    }
}
