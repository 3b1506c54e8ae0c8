//! Realtime status gateway.
//!
//! Bridges the notification bus to per-user event streams. Each stream
//! holds its own bus subscription and drops envelopes addressed to
//! other users before they reach the client.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use futures::Stream;
use tokio::sync::broadcast;
use tracing::{info, warn};

use picflow_core::events::StatusEnvelope;
use picflow_core::traits::NotificationBus;
use picflow_core::types::UserId;

/// Gateway counters, readable for health reporting.
#[derive(Debug, Default)]
pub struct GatewayMetrics {
    /// Streams currently open.
    pub subscribers_active: AtomicUsize,
    /// Streams opened since startup.
    pub subscribers_total: AtomicU64,
    /// Envelopes delivered to clients since startup.
    pub envelopes_delivered: AtomicU64,
}

/// Fans bus envelopes out to per-user streams.
#[derive(Debug, Clone)]
pub struct StatusGateway {
    bus: Arc<dyn NotificationBus>,
    metrics: Arc<GatewayMetrics>,
}

/// Releases the active-subscriber count when a stream is dropped.
#[derive(Debug)]
struct SubscriptionGuard {
    metrics: Arc<GatewayMetrics>,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.metrics
            .subscribers_active
            .fetch_sub(1, Ordering::Relaxed);
    }
}

impl StatusGateway {
    pub fn new(bus: Arc<dyn NotificationBus>) -> Self {
        Self {
            bus,
            metrics: Arc::new(GatewayMetrics::default()),
        }
    }

    /// Gateway counters.
    pub fn metrics(&self) -> &GatewayMetrics {
        &self.metrics
    }

    /// Open a stream of envelopes addressed to `user_id`.
    ///
    /// The stream ends when the bus closes, or when the subscriber
    /// lags past the bus buffer — a lagged client has already lost
    /// envelopes, so the stream closes and the client reconnects for
    /// a fresh subscription.
    pub fn open_stream(&self, user_id: UserId) -> impl Stream<Item = StatusEnvelope> + Send {
        let receiver = self.bus.subscribe();
        self.metrics.subscribers_active.fetch_add(1, Ordering::Relaxed);
        self.metrics.subscribers_total.fetch_add(1, Ordering::Relaxed);
        info!(user_id = %user_id, "Realtime status stream opened");

        let guard = SubscriptionGuard {
            metrics: Arc::clone(&self.metrics),
        };
        let metrics = Arc::clone(&self.metrics);

        futures::stream::unfold((receiver, guard), move |(mut receiver, guard)| {
            let metrics = Arc::clone(&metrics);
            async move {
                loop {
                    match receiver.recv().await {
                        Ok(envelope) if envelope.user_id == user_id => {
                            metrics.envelopes_delivered.fetch_add(1, Ordering::Relaxed);
                            return Some((envelope, (receiver, guard)));
                        }
                        Ok(_) => continue,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(
                                user_id = %user_id,
                                skipped,
                                "Status stream lagged past the bus buffer; closing"
                            );
                            return None;
                        }
                        Err(broadcast::error::RecvError::Closed) => return None,
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use futures::StreamExt;

    use picflow_core::types::JobId;

    use crate::bus::memory::MemoryNotificationBus;

    fn gateway_with_bus() -> (StatusGateway, Arc<MemoryNotificationBus>) {
        let bus = Arc::new(MemoryNotificationBus::new(16));
        (StatusGateway::new(bus.clone()), bus)
    }

    #[tokio::test]
    async fn test_stream_only_yields_own_envelopes() {
        let (gateway, bus) = gateway_with_bus();
        let me = UserId::new();
        let other = UserId::new();

        let mut stream = Box::pin(gateway.open_stream(me));

        bus.publish(StatusEnvelope::new(JobId::new(), other, "PROCESSING", None))
            .await
            .expect("publish");
        let mine = StatusEnvelope::new(JobId::new(), me, "PROCESSED", None);
        bus.publish(mine.clone()).await.expect("publish");

        assert_eq!(stream.next().await.expect("envelope"), mine);
    }

    #[tokio::test]
    async fn test_active_count_tracks_stream_lifetime() {
        let (gateway, _bus) = gateway_with_bus();
        assert_eq!(gateway.metrics().subscribers_active.load(Ordering::Relaxed), 0);

        let stream = gateway.open_stream(UserId::new());
        assert_eq!(gateway.metrics().subscribers_active.load(Ordering::Relaxed), 1);

        drop(stream);
        assert_eq!(gateway.metrics().subscribers_active.load(Ordering::Relaxed), 0);
        assert_eq!(gateway.metrics().subscribers_total.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_delivered_counter_counts_each_envelope() {
        let (gateway, bus) = gateway_with_bus();
        let user = UserId::new();
        let mut stream = Box::pin(gateway.open_stream(user));

        for status in ["UPLOADING", "PROCESSING", "PROCESSED"] {
            bus.publish(StatusEnvelope::new(JobId::new(), user, status, None))
                .await
                .expect("publish");
        }

        for _ in 0..3 {
            stream.next().await.expect("envelope");
        }
        assert_eq!(
            gateway.metrics().envelopes_delivered.load(Ordering::Relaxed),
            3
        );
    }

    #[tokio::test]
    async fn test_lagged_stream_closes() {
        let bus = Arc::new(MemoryNotificationBus::new(2));
        let gateway = StatusGateway::new(bus.clone());
        let user = UserId::new();
        let mut stream = Box::pin(gateway.open_stream(user));

        // Overflow the bus buffer before the stream is polled.
        for _ in 0..8 {
            bus.publish(StatusEnvelope::new(JobId::new(), user, "PROCESSING", None))
                .await
                .expect("publish");
        }

        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_stream_ends_when_bus_closes() {
        let (gateway, bus) = gateway_with_bus();
        let mut stream = Box::pin(gateway.open_stream(UserId::new()));
        drop(bus);
        drop(gateway);
        assert!(stream.next().await.is_none());
    }
}
