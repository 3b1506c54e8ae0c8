//! Webhook intake for blob-store upload notifications.
//!
//! Two event shapes arrive on the same endpoint: the one-time
//! subscription-confirmation handshake and object-created
//! notifications. Both are acknowledged unconditionally; all failure
//! handling is internal.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info, warn};

use picflow_broker::QueueRouter;
use picflow_core::result::AppResult;
use picflow_entity::job::{JobStore, TransformJob};

/// Event name published for completed uploads.
const OBJECT_CREATED_PUT: &str = "ObjectCreated:Put";

/// How often the job lookup is retried when the upload-success event
/// races the key write.
const LOOKUP_ATTEMPTS: u32 = 3;
const LOOKUP_BACKOFF: Duration = Duration::from_millis(200);

/// Inbound notification envelope.
///
/// Field casing follows the publisher's wire format, hence the
/// explicit renames.
#[derive(Debug, Clone, Deserialize)]
pub struct SnsEnvelope {
    /// Message type discriminator (`SubscriptionConfirmation` for the
    /// handshake).
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
    /// Confirmation URL, present only on the handshake.
    #[serde(rename = "SubscribeURL", default)]
    pub subscribe_url: Option<String>,
    /// Object event records, present only on notifications.
    #[serde(rename = "Records", default)]
    pub records: Vec<S3Record>,
}

/// One object event record.
#[derive(Debug, Clone, Deserialize)]
pub struct S3Record {
    /// Event name, e.g. `ObjectCreated:Put`.
    #[serde(rename = "eventName")]
    pub event_name: String,
    /// Object details.
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub object: S3Object,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Object {
    /// The blob-store key of the created object.
    pub key: String,
}

/// Handles upload-notification webhooks.
#[derive(Debug, Clone)]
pub struct WebhookService {
    store: Arc<dyn JobStore>,
    router: QueueRouter,
    http: reqwest::Client,
}

impl WebhookService {
    pub fn new(store: Arc<dyn JobStore>, router: QueueRouter) -> Self {
        Self {
            store,
            router,
            http: reqwest::Client::new(),
        }
    }

    /// Process one webhook delivery. Never fails: the endpoint always
    /// acknowledges, and every failure path is logged here.
    pub async fn handle(&self, envelope: SnsEnvelope) {
        if envelope.kind.as_deref() == Some("SubscriptionConfirmation") {
            self.confirm_subscription(envelope.subscribe_url).await;
            return;
        }

        for record in envelope.records {
            if record.event_name != OBJECT_CREATED_PUT {
                continue;
            }
            self.handle_upload_success(record.s3.object.key).await;
        }
    }

    /// Confirm the subscription with a single GET to the provided URL.
    async fn confirm_subscription(&self, subscribe_url: Option<String>) {
        let url = match subscribe_url {
            Some(url) if !url.is_empty() => url,
            _ => {
                warn!("Subscription confirmation without a SubscribeURL; acknowledged anyway");
                return;
            }
        };

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                info!("Webhook subscription confirmed");
            }
            Ok(response) => {
                warn!(status = %response.status(), "Subscription confirmation was refused");
            }
            Err(e) => {
                warn!(error = %e, "Subscription confirmation request failed");
            }
        }
    }

    /// Correlate an upload-success event with its job and kick off
    /// routing as a detached task.
    async fn handle_upload_success(&self, key: String) {
        let job = match self.find_job_with_retry(&key).await {
            Ok(Some(job)) => job,
            Ok(None) => {
                warn!(key = %key, "Upload event matched no job; dropped");
                return;
            }
            Err(e) => {
                error!(key = %key, error = %e, "Job lookup failed for upload event; dropped");
                return;
            }
        };

        // Acknowledge before routing completes; routing failures are
        // the router's to log and the sweeper's to reconcile.
        let router = self.router.clone();
        tokio::spawn(async move {
            if let Err(e) = router.route(&job).await {
                error!(job_id = %job.id, error = %e, "Detached routing failed");
            }
        });
    }

    /// Look the job up by object key, retrying with backoff to cover
    /// the window where the event arrives before the key write commits.
    async fn find_job_with_retry(&self, key: &str) -> AppResult<Option<TransformJob>> {
        for attempt in 1..=LOOKUP_ATTEMPTS {
            if let Some(job) = self.store.find_by_raw_key(key).await? {
                return Ok(Some(job));
            }
            if attempt < LOOKUP_ATTEMPTS {
                tokio::time::sleep(LOOKUP_BACKOFF * attempt).await;
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;

    use picflow_broker::BindingTable;
    use picflow_core::traits::QueuePublisher;
    use picflow_core::types::UserId;
    use picflow_entity::job::CreateJob;
    use picflow_entity::transformation::TransformationType;
    use picflow_entity::wire::WorkOrder;

    use crate::testing::MemoryJobStore;

    #[derive(Debug, Default)]
    struct RecordingPublisher {
        published: Mutex<Vec<(String, Vec<u8>)>>,
    }

    #[async_trait]
    impl QueuePublisher for RecordingPublisher {
        async fn publish(&self, queue: &str, payload: &[u8]) -> AppResult<()> {
            self.published
                .lock()
                .unwrap()
                .push((queue.to_string(), payload.to_vec()));
            Ok(())
        }
    }

    async fn service_with_job(key: &str) -> (WebhookService, Arc<RecordingPublisher>, TransformJob) {
        let store = Arc::new(MemoryJobStore::default());
        let publisher = Arc::new(RecordingPublisher::default());
        let job = store
            .create(&CreateJob {
                user_id: UserId::new(),
                filename: "photo.png".into(),
                transformation_type: TransformationType::Rotate,
                transformation_parameters: serde_json::json!({ "degree": 180 }),
            })
            .await
            .expect("create");
        store.set_raw_object_key(job.id, key).await.expect("set key");
        let job = store.job(job.id).expect("job");

        let router = QueueRouter::new(publisher.clone(), BindingTable::standard());
        (WebhookService::new(store, router), publisher, job)
    }

    fn object_created(key: &str) -> SnsEnvelope {
        serde_json::from_value(serde_json::json!({
            "Records": [{
                "eventName": "ObjectCreated:Put",
                "s3": { "object": { "key": key } }
            }]
        }))
        .expect("envelope")
    }

    #[tokio::test]
    async fn test_upload_success_routes_the_job() {
        let key = "raw/user-1-photo.png";
        let (service, publisher, job) = service_with_job(key).await;

        service.handle(object_created(key)).await;
        // Routing is detached; give the spawned task a moment.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let published = publisher.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "rotate_queue");
        let order: WorkOrder = serde_json::from_slice(&published[0].1).expect("order");
        assert_eq!(order.id, job.id);
    }

    #[tokio::test]
    async fn test_unknown_key_is_dropped() {
        let (service, publisher, _job) = service_with_job("raw/known-key").await;

        service.handle(object_created("raw/other-key")).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(publisher.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_put_events_are_ignored() {
        let key = "raw/user-1-photo.png";
        let (service, publisher, _job) = service_with_job(key).await;

        let envelope: SnsEnvelope = serde_json::from_value(serde_json::json!({
            "Records": [{
                "eventName": "ObjectRemoved:Delete",
                "s3": { "object": { "key": key } }
            }]
        }))
        .expect("envelope");
        service.handle(envelope).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(publisher.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_handshake_without_url_still_acknowledges() {
        let (service, _publisher, _job) = service_with_job("raw/key").await;

        let envelope: SnsEnvelope = serde_json::from_value(serde_json::json!({
            "Type": "SubscriptionConfirmation"
        }))
        .expect("envelope");
        // Must return normally; the warning is the only trace.
        service.handle(envelope).await;
    }
}
