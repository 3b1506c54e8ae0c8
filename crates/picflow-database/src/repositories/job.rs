//! Transformation job repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use picflow_core::error::{AppError, ErrorKind};
use picflow_core::result::AppResult;
use picflow_core::types::JobId;
use picflow_entity::job::{CreateJob, JobStatus, JobStore, StatusTransition, TransformJob};

/// PostgreSQL-backed job store.
///
/// Status writes are conditional on the expected current status
/// (optimistic check); a lost race surfaces as `None`, never as a
/// blocked transaction.
#[derive(Debug, Clone)]
pub struct TransformJobRepository {
    pool: PgPool,
}

impl TransformJobRepository {
    /// Create a new job repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for TransformJobRepository {
    async fn create(&self, data: &CreateJob) -> AppResult<TransformJob> {
        sqlx::query_as::<_, TransformJob>(
            "INSERT INTO transform_jobs \
             (user_id, filename, status, transformation_type, transformation_parameters) \
             VALUES ($1, $2, 'PENDING', $3, $4) RETURNING *",
        )
        .bind(data.user_id)
        .bind(&data.filename)
        .bind(data.transformation_type)
        .bind(&data.transformation_parameters)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Infrastructure, "Failed to create job", e))
    }

    async fn find_by_id(&self, id: JobId) -> AppResult<Option<TransformJob>> {
        sqlx::query_as::<_, TransformJob>("SELECT * FROM transform_jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Infrastructure, "Failed to find job", e))
    }

    async fn find_by_raw_key(&self, key: &str) -> AppResult<Option<TransformJob>> {
        sqlx::query_as::<_, TransformJob>(
            "SELECT * FROM transform_jobs WHERE raw_object_key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Infrastructure, "Failed to find job by raw key", e)
        })
    }

    async fn set_raw_object_key(&self, id: JobId, key: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE transform_jobs SET raw_object_key = $2, updated_at = NOW() \
             WHERE id = $1 AND raw_object_key IS NULL",
        )
        .bind(id)
        .bind(key)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Infrastructure, "Failed to set raw object key", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::internal(format!(
                "raw object key already set for job {id}"
            )));
        }
        Ok(())
    }

    async fn apply_transition(
        &self,
        id: JobId,
        transition: &StatusTransition,
    ) -> AppResult<Option<TransformJob>> {
        // public_url only lands on PROCESSED, error_message only on
        // FAILED; the other column is nulled by binding None.
        let public_url = match transition.target {
            JobStatus::Processed => transition.public_url.as_deref(),
            _ => None,
        };
        let error_message = match transition.target {
            JobStatus::Failed => transition.error_message.as_deref(),
            _ => None,
        };

        sqlx::query_as::<_, TransformJob>(
            "UPDATE transform_jobs \
             SET status = $3, public_url = $4, error_message = $5, updated_at = NOW() \
             WHERE id = $1 AND status = $2 RETURNING *",
        )
        .bind(id)
        .bind(transition.expected)
        .bind(transition.target)
        .bind(public_url)
        .bind(error_message)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Infrastructure, "Failed to apply transition", e)
        })
    }

    async fn find_stuck_uploads(
        &self,
        threshold: DateTime<Utc>,
    ) -> AppResult<Vec<TransformJob>> {
        sqlx::query_as::<_, TransformJob>(
            "SELECT * FROM transform_jobs \
             WHERE status = 'UPLOADING' AND updated_at <= $1 \
             ORDER BY updated_at ASC",
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Infrastructure, "Failed to find stuck uploads", e)
        })
    }

    async fn delete(&self, id: JobId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM transform_jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Infrastructure, "Failed to delete job", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
