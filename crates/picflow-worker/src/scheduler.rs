//! Timer scheduling for the reconciliation sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::{error, info};

use picflow_core::config::sweeper::SweeperConfig;
use picflow_core::error::AppError;
use picflow_core::result::AppResult;

use crate::jobs::reconcile::ReconcileSweeper;

/// Owns the scheduler running the periodic reconciliation sweep.
pub struct SweepScheduler {
    scheduler: JobScheduler,
}

impl std::fmt::Debug for SweepScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepScheduler").finish()
    }
}

impl SweepScheduler {
    /// Build a scheduler with the sweep registered at the configured
    /// interval. Does not start it.
    pub async fn new(sweeper: Arc<ReconcileSweeper>, config: &SweeperConfig) -> AppResult<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        let interval = Duration::from_secs(config.interval_seconds);
        let job = CronJob::new_repeated_async(interval, move |_uuid, _lock| {
            let sweeper = Arc::clone(&sweeper);
            Box::pin(async move {
                if let Err(e) = sweeper.run_once().await {
                    error!(error = %e, "Reconciliation sweep tick failed");
                }
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create sweep schedule: {e}")))?;

        scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add sweep schedule: {e}")))?;

        info!(
            interval_seconds = config.interval_seconds,
            threshold_seconds = config.threshold_seconds,
            "Registered reconciliation sweep"
        );

        Ok(Self { scheduler })
    }

    /// Start ticking.
    pub async fn start(&self) -> AppResult<()> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;
        info!("Sweep scheduler started");
        Ok(())
    }

    /// Stop the scheduler.
    pub async fn shutdown(&mut self) -> AppResult<()> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shut down scheduler: {e}")))?;
        info!("Sweep scheduler shut down");
        Ok(())
    }
}
