//! S3-compatible blob store implementation.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use tracing::info;

use picflow_core::config::storage::StorageConfig;
use picflow_core::error::{AppError, ErrorKind};
use picflow_core::result::AppResult;
use picflow_core::traits::BlobStore;

/// S3-backed blob store.
///
/// PicFlow only probes, deletes, and presigns; object bytes never pass
/// through this service.
#[derive(Debug, Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    /// Create a new S3 blob store from configuration.
    ///
    /// Credentials come from the ambient AWS environment (env vars,
    /// profile, or instance role). A non-empty `endpoint` overrides the
    /// AWS endpoint for S3-compatible services like MinIO.
    pub async fn new(config: &StorageConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if !config.endpoint.is_empty() {
            loader = loader.endpoint_url(&config.endpoint);
        }
        let sdk_config = loader.load().await;

        info!(
            bucket = %config.bucket,
            region = %config.region,
            "Initialized S3 blob store"
        );

        Self {
            client: Client::new(&sdk_config),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn exists(&self, key: &str) -> AppResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(AppError::with_source(
                        ErrorKind::Infrastructure,
                        format!("HeadObject failed for '{key}'"),
                        service_err,
                    ))
                }
            }
        }
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Infrastructure,
                    format!("DeleteObject failed for '{key}'"),
                    e,
                )
            })?;
        Ok(())
    }

    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> AppResult<String> {
        let presigning = PresigningConfig::expires_in(expires_in).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid presign expiry {expires_in:?}"),
                e,
            )
        })?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Infrastructure,
                    format!("Failed to presign PUT for '{key}'"),
                    e,
                )
            })?;

        Ok(request.uri().to_string())
    }
}
