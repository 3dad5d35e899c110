//! MusCo Backend Service
//!
//! Main entry point for the inventory backend.
//! This service provides:
//! - REST API for products, purchases, sells and reports
//! - Background sweeper reclaiming expired tester records

use anyhow::Context;
use musco_backend::api;
use musco_backend::config::{AppConfig, StorageBackend};
use musco_backend::database;
use musco_backend::expiry::ExpirySweeper;
use musco_backend::store::{InventoryStore, MemoryInventoryStore, PgInventoryStore};
use musco_backend::{AppError, AppState};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "musco_backend={},sqlx=warn,tower_http=info",
            config.log_level
        )
        .into()
    });

    if config.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    init_tracing(&config);

    info!("MusCo backend starting");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);
    info!("HTTP port: {}", config.http_port);

    // =========================================================================
    // STORAGE SETUP
    // =========================================================================
    let store: Arc<dyn InventoryStore> = match config.storage {
        StorageBackend::Postgres => {
            info!("Connecting to database...");
            let pool = database::connect(&config.database).await.map_err(|e| {
                error!("Failed to open database pool: {}", e);
                AppError::Database(e)
            })?;
            info!(
                "Database pool ready (max connections: {})",
                config.database.max_connections
            );

            info!("Running database migrations...");
            database::prepare(&pool).await.map_err(|e| {
                error!("Database preparation failed: {}", e);
                AppError::Database(e)
            })?;
            info!("Migrations applied, inventory schema verified");

            Arc::new(PgInventoryStore::new(pool))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; all data is lost on shutdown");
            Arc::new(MemoryInventoryStore::new())
        }
    };

    let state = Arc::new(AppState::from_config(store.clone(), &config));
    if state.allow_token_issue {
        warn!("Development token issuance enabled at POST /auth/token");
    }

    // =========================================================================
    // BACKGROUND TASKS
    // =========================================================================
    let sweeper = ExpirySweeper::new(
        store,
        config.tester_retention(),
        config.expiry_sweep_interval(),
    );
    let sweeper_handle = tokio::spawn(async move {
        sweeper.start().await;
    });

    // =========================================================================
    // HTTP SERVER
    // =========================================================================
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP listener on {}", addr))?;
    info!("HTTP API listening on {}", addr);

    let server = axum::serve(listener, api::router(state)).into_future();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down gracefully...");
        }
        result = server => {
            if let Err(e) = result {
                error!("HTTP server error: {}", e);
            }
        }
        _ = sweeper_handle => {
            error!("Expiry sweeper exited unexpectedly");
        }
    }

    info!("MusCo backend shutdown complete");
    Ok(())
}
