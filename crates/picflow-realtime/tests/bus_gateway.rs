//! In-process tests for the bus → gateway delivery path.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;

use picflow_core::events::StatusEnvelope;
use picflow_core::traits::NotificationBus;
use picflow_core::types::{JobId, UserId};
use picflow_realtime::{MemoryNotificationBus, StatusGateway};

#[tokio::test]
async fn test_envelopes_fan_out_to_multiple_streams_of_one_user() {
    let bus = Arc::new(MemoryNotificationBus::new(32));
    let gateway = StatusGateway::new(bus.clone());
    let user = UserId::new();

    let mut stream_a = Box::pin(gateway.open_stream(user));
    let mut stream_b = Box::pin(gateway.open_stream(user));

    let envelope = StatusEnvelope::new(JobId::new(), user, "PROCESSING", None);
    bus.publish(envelope.clone()).await.expect("publish");

    assert_eq!(stream_a.next().await.expect("a"), envelope);
    assert_eq!(stream_b.next().await.expect("b"), envelope);
}

#[tokio::test]
async fn test_per_publisher_ordering_is_preserved() {
    let bus = Arc::new(MemoryNotificationBus::new(32));
    let gateway = StatusGateway::new(bus.clone());
    let user = UserId::new();
    let job = JobId::new();

    let mut stream = Box::pin(gateway.open_stream(user));

    for status in ["UPLOADING", "PROCESSING", "PROCESSED"] {
        bus.publish(StatusEnvelope::new(job, user, status, None))
            .await
            .expect("publish");
    }

    assert_eq!(stream.next().await.expect("first").status, "UPLOADING");
    assert_eq!(stream.next().await.expect("second").status, "PROCESSING");
    assert_eq!(stream.next().await.expect("third").status, "PROCESSED");
}

#[tokio::test]
async fn test_other_users_never_observe_foreign_envelopes() {
    let bus = Arc::new(MemoryNotificationBus::new(32));
    let gateway = StatusGateway::new(bus.clone());
    let me = UserId::new();
    let other = UserId::new();

    let mut stream = Box::pin(gateway.open_stream(me));

    bus.publish(StatusEnvelope::new(JobId::new(), other, "FAILED", None))
        .await
        .expect("publish");

    // The foreign envelope must be discarded, not buffered.
    let next = tokio::time::timeout(Duration::from_millis(100), stream.next()).await;
    assert!(next.is_err(), "stream must stay pending");
}

#[tokio::test]
async fn test_dropping_a_stream_releases_its_subscription() {
    let bus = Arc::new(MemoryNotificationBus::new(32));
    let gateway = StatusGateway::new(bus.clone());

    let stream_a = gateway.open_stream(UserId::new());
    let stream_b = gateway.open_stream(UserId::new());
    assert_eq!(
        gateway
            .metrics()
            .subscribers_active
            .load(std::sync::atomic::Ordering::Relaxed),
        2
    );

    drop(stream_a);
    drop(stream_b);
    assert_eq!(
        gateway
            .metrics()
            .subscribers_active
            .load(std::sync::atomic::Ordering::Relaxed),
        0
    );
}
