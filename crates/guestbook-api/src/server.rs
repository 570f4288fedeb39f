//! Server setup and initialization
//!
//! Provides the application builder, dependency wiring, and server runner.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use guestbook_common::{AppConfig, AppError, JwtService};
use guestbook_core::SnowflakeGenerator;
use guestbook_db::{
    create_pool, run_migrations, PgEventRepository, PgGuestTokenRepository,
    PgMediaFileRepository, PgMessageRepository, PoolConfig,
};
use guestbook_service::{ServiceContextBuilder, ServiceSettings};
use guestbook_storage::LocalBlobStore;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::background::spawn_sweeper;
use crate::middleware::{apply_common_layers, apply_middleware_with_config};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
///
/// Health routes get tracing but no rate limit so probes are never throttled.
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config();
    let max_upload_bytes =
        usize::try_from(config.storage.max_file_size_bytes()).unwrap_or(usize::MAX);

    let api = apply_middleware_with_config(
        create_router(max_upload_bytes),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    )?;
    let health = apply_common_layers(health_routes());

    Ok(api.merge(health).with_state(state))
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&PoolConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    if config.database.run_migrations {
        run_migrations(&pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        info!("Database migrations applied");
    }

    let blob_store = LocalBlobStore::new(&config.storage.upload_dir, &config.app.public_base_url)
        .await
        .map_err(|e| AppError::Config(format!("blob store: {}", e)))?;
    info!(upload_dir = %config.storage.upload_dir, "Blob store ready");

    let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.access_token_expiry);
    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));

    let service_context = ServiceContextBuilder::new()
        .event_repo(Arc::new(PgEventRepository::new(pool.clone())))
        .message_repo(Arc::new(PgMessageRepository::new(pool.clone())))
        .media_repo(Arc::new(PgMediaFileRepository::new(pool.clone())))
        .token_repo(Arc::new(PgGuestTokenRepository::new(pool.clone())))
        .blob_store(Arc::new(blob_store))
        .snowflake_generator(snowflake_generator)
        .settings(ServiceSettings::from_config(&config))
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, config, jwt_service, pool))
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {}", e)))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid API address: {}", e)))?;

    let state = create_app_state(config).await?;

    let sweep = &state.config().sweep;
    let sweeper = spawn_sweeper(
        state.shared_context(),
        sweep.interval(),
        sweep.incomplete_media_max_age(),
    );

    let app = create_app(state)?;

    let result = run_server(app, addr).await;
    sweeper.abort();
    info!("Server stopped");
    result
}

/// Resolves on Ctrl+C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        () = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
