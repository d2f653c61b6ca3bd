use std::net::SocketAddr;
use std::sync::Arc;

use docvault_api::config::ServerConfig;
use docvault_api::router::build_app_router;
use docvault_api::state::AppState;
use docvault_core::storage::LocalDisk;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docvault_api=debug,docvault_db=debug,tower_http=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = docvault_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    docvault_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    docvault_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let legacy_pool = match std::env::var("LEGACY_DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => {
            let legacy = docvault_db::create_legacy_pool(&url)
                .await
                .expect("Failed to connect to legacy database");
            docvault_db::health_check(&legacy)
                .await
                .expect("Legacy database health check failed");
            tracing::info!("Legacy database connection pool created");
            legacy
        }
        _ => {
            tracing::warn!("LEGACY_DATABASE_URL not set, reading legacy tables from the primary database");
            pool.clone()
        }
    };

    // --- Storage ---
    let storage_root = config.storage.root.clone();
    tokio::fs::create_dir_all(&storage_root)
        .await
        .expect("Failed to create storage root");
    tracing::info!(root = %storage_root.display(), "Local storage disk ready");

    // --- App state ---
    let state = AppState {
        pool: pool.clone(),
        legacy_pool: legacy_pool.clone(),
        config: Arc::new(config.clone()),
        storage: Arc::new(LocalDisk::new(storage_root)),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, closing pools");
    let close = async {
        pool.close().await;
        legacy_pool.close().await;
    };
    if tokio::time::timeout(
        std::time::Duration::from_secs(config.shutdown_timeout_secs),
        close,
    )
    .await
    .is_err()
    {
        tracing::warn!("Timed out closing database pools");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
