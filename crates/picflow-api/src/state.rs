//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use picflow_core::config::AppConfig;
use picflow_realtime::StatusGateway;
use picflow_service::upload::UploadService;
use picflow_service::webhook::WebhookService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool (health checks only; handlers go
    /// through the services).
    pub db_pool: PgPool,
    /// Upload slot creation and manual status updates.
    pub upload: Arc<UploadService>,
    /// Webhook intake.
    pub webhook: Arc<WebhookService>,
    /// Realtime status stream gateway.
    pub gateway: StatusGateway,
}
