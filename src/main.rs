//! PicFlow Server — asynchronous image-transformation orchestration.
//!
//! Main entry point that wires all crates together and starts the
//! server: job store, blob store, queue router, notification bus,
//! status consumer, reconciliation sweeper, and the HTTP API.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use picflow_core::config::AppConfig;
use picflow_core::error::AppError;
use picflow_core::traits::{BlobStore, NotificationBus, QueuePublisher};
use picflow_entity::job::JobStore;

#[tokio::main]
async fn main() {
    let env = std::env::var("PICFLOW_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting PicFlow v{}", env!("CARGO_PKG_VERSION"));
    let config = Arc::new(config);

    // ── Database + migrations ────────────────────────────────────
    let db = picflow_database::DatabasePool::connect(&config.database).await?;
    picflow_database::migration::run_migrations(db.pool()).await?;

    let store: Arc<dyn JobStore> = Arc::new(
        picflow_database::repositories::job::TransformJobRepository::new(db.pool().clone()),
    );

    // ── Blob store ───────────────────────────────────────────────
    let blobs: Arc<dyn BlobStore> =
        Arc::new(picflow_storage::s3::S3BlobStore::new(&config.storage).await);

    // ── Broker: publisher, router, status consumer ───────────────
    let publisher: Arc<dyn QueuePublisher> =
        Arc::new(picflow_broker::RedisQueuePublisher::connect(&config.broker).await?);
    let router = picflow_broker::QueueRouter::new(
        Arc::clone(&publisher),
        picflow_broker::BindingTable::standard(),
    );

    // ── Notification bus + gateway ───────────────────────────────
    let bus: Arc<dyn NotificationBus> = match config.realtime.provider.as_str() {
        "redis" => {
            Arc::new(picflow_realtime::RedisNotificationBus::connect(&config.realtime).await?)
        }
        _ => Arc::new(picflow_realtime::MemoryNotificationBus::new(
            config.realtime.buffer_size,
        )),
    };
    let gateway = picflow_realtime::StatusGateway::new(Arc::clone(&bus));

    // ── Services ─────────────────────────────────────────────────
    let engine = picflow_service::TransitionEngine::new(Arc::clone(&store), Arc::clone(&bus));
    let upload = Arc::new(picflow_service::UploadService::new(
        Arc::clone(&store),
        Arc::clone(&blobs),
        engine.clone(),
        Duration::from_secs(config.storage.presign_expiry_seconds),
    ));
    let webhook = Arc::new(picflow_service::WebhookService::new(
        Arc::clone(&store),
        router,
    ));

    // ── Status consumer ──────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let ingress = Arc::new(picflow_service::StatusIngress::new(engine));
    let consumer = picflow_broker::StatusConsumer::connect(&config.broker, ingress).await?;
    let consumer_task = tokio::spawn(consumer.run(shutdown_rx));

    // ── Reconciliation sweeper ───────────────────────────────────
    let mut scheduler = if config.sweeper.enabled {
        let sweeper = Arc::new(picflow_worker::ReconcileSweeper::new(
            Arc::clone(&store),
            Arc::clone(&blobs),
            Duration::from_secs(config.sweeper.threshold_seconds),
            config.sweeper.probe_concurrency,
        ));
        let scheduler = picflow_worker::SweepScheduler::new(sweeper, &config.sweeper).await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Reconciliation sweeper disabled");
        None
    };

    // ── HTTP server ──────────────────────────────────────────────
    let state = picflow_api::AppState {
        config: Arc::clone(&config),
        db_pool: db.pool().clone(),
        upload,
        webhook,
        gateway,
    };
    let app = picflow_api::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!("PicFlow listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Shutdown ─────────────────────────────────────────────────
    tracing::info!("Shutting down...");
    let _ = shutdown_tx.send(true);
    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.shutdown().await?;
    }
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    if tokio::time::timeout(grace, consumer_task).await.is_err() {
        tracing::warn!("Status consumer did not stop within the grace period");
    }
    db.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Resolve when SIGINT (or SIGTERM on Unix) arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
