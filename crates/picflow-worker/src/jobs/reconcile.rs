//! Reconciliation sweep for orphaned in-flight uploads.
//!
//! A job stuck in `UPLOADING` past the threshold either has its object
//! in the blob store (the webhook was lost; leave it for routing
//! recovery) or never finished uploading (delete the record). Only a
//! definitive "object absent" probe deletes; probe errors leave the
//! record for the next tick.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use picflow_core::result::AppResult;
use picflow_core::traits::BlobStore;
use picflow_entity::job::{JobStore, TransformJob};

/// Outcome counters for one sweep tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    /// Stuck records examined.
    pub scanned: usize,
    /// Records deleted because their object was definitively absent.
    pub deleted: usize,
    /// Records kept (object present, or the probe failed).
    pub kept: usize,
}

/// Deletes abandoned upload records after probing the blob store.
#[derive(Debug, Clone)]
pub struct ReconcileSweeper {
    store: Arc<dyn JobStore>,
    blobs: Arc<dyn BlobStore>,
    threshold: Duration,
    probe_concurrency: usize,
}

impl ReconcileSweeper {
    pub fn new(
        store: Arc<dyn JobStore>,
        blobs: Arc<dyn BlobStore>,
        threshold: Duration,
        probe_concurrency: usize,
    ) -> Self {
        Self {
            store,
            blobs,
            threshold,
            probe_concurrency: probe_concurrency.max(1),
        }
    }

    /// Run one sweep tick.
    ///
    /// Probes run concurrently up to the configured limit; a failure on
    /// one record never aborts the rest of the batch.
    pub async fn run_once(&self) -> AppResult<SweepStats> {
        let threshold = Utc::now() - chrono::Duration::seconds(self.threshold.as_secs() as i64);
        let stuck = self.store.find_stuck_uploads(threshold).await?;

        let mut stats = SweepStats {
            scanned: stuck.len(),
            ..SweepStats::default()
        };
        if stuck.is_empty() {
            return Ok(stats);
        }

        info!(candidates = stuck.len(), "Reconciliation sweep starting");

        let semaphore = Arc::new(Semaphore::new(self.probe_concurrency));
        let mut probes = JoinSet::new();
        for job in stuck {
            let semaphore = Arc::clone(&semaphore);
            let store = Arc::clone(&self.store);
            let blobs = Arc::clone(&self.blobs);
            probes.spawn(async move {
                // Semaphore is never closed, so acquire cannot fail.
                let _permit = semaphore.acquire_owned().await;
                reconcile_one(store, blobs, job).await
            });
        }

        while let Some(result) = probes.join_next().await {
            match result {
                Ok(true) => stats.deleted += 1,
                Ok(false) => stats.kept += 1,
                Err(e) => {
                    stats.kept += 1;
                    error!(error = %e, "Reconciliation probe task panicked");
                }
            }
        }

        info!(
            scanned = stats.scanned,
            deleted = stats.deleted,
            kept = stats.kept,
            "Reconciliation sweep finished"
        );
        Ok(stats)
    }
}

/// Probe one record; returns `true` when the record was deleted.
async fn reconcile_one(
    store: Arc<dyn JobStore>,
    blobs: Arc<dyn BlobStore>,
    job: TransformJob,
) -> bool {
    let key = match job.raw_object_key.as_deref() {
        Some(key) => key,
        None => {
            warn!(job_id = %job.id, "Stuck upload has no object key; kept");
            return false;
        }
    };

    match blobs.exists(key).await {
        Ok(true) => {
            info!(job_id = %job.id, "Stuck upload's object exists; record kept");
            false
        }
        Ok(false) => match store.delete(job.id).await {
            Ok(removed) => {
                if removed {
                    info!(job_id = %job.id, "Deleted abandoned upload record");
                }
                removed
            }
            Err(e) => {
                error!(job_id = %job.id, error = %e, "Failed to delete abandoned record");
                false
            }
        },
        Err(e) => {
            warn!(job_id = %job.id, error = %e, "Object probe failed; record kept");
            false
        }
    }
}
