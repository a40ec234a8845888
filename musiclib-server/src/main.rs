//! musiclib - music catalog HTTP API server
//!
//! Serves CRUD endpoints for artists, songs and song details backed by
//! PostgreSQL. Configuration comes from flags, the environment and an
//! optional `.env` file.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use musiclib_common::config::load_dotenv;
use musiclib_common::db::{Artist, Entity, Song, SongDetail, Storage};
use musiclib_server::config::ServerConfig;
use musiclib_server::shutdown::shutdown_signal;
use musiclib_server::{build_router, logging, AppState};
use tokio::sync::oneshot;
use tracing::{error, info, warn};

/// How long in-flight requests get to finish after a shutdown signal
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads the environment
    let dotenv = load_dotenv();
    let config = ServerConfig::parse();

    logging::init(&config);

    info!(
        "Starting musiclib v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match dotenv {
        Some(path) => info!("Loaded environment from {}", path.display()),
        None => info!("No .env file found, using process environment"),
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(e.into());
    }
    info!(env = ?config.app_env, database = ?config.database, "Configuration loaded");

    let storage = Storage::connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    check_schema::<Artist>(&storage).await;
    check_schema::<Song>(&storage).await;
    check_schema::<SongDetail>(&storage).await;

    let app = build_router(AppState::new(storage.clone()));

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("musiclib listening on http://{}", listener.local_addr()?);

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async {
            let _ = stop_rx.await;
        })
        .await
    });

    shutdown_signal().await;
    info!("Shutdown signal received, draining connections");
    let _ = stop_tx.send(());

    match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
        Ok(Ok(Ok(()))) => info!("Server stopped"),
        Ok(Ok(Err(e))) => error!("Server error: {}", e),
        Ok(Err(e)) => error!("Server task failed: {}", e),
        Err(_) => warn!(
            "Connections still open after {:?}, shutting down anyway",
            SHUTDOWN_GRACE
        ),
    }

    storage.close().await;
    info!("Database pool closed");

    Ok(())
}

/// Log any difference between the live schema and the model metadata
async fn check_schema<T: Entity>(storage: &Storage) {
    match storage.check_schema::<T>().await {
        Ok(drift) if drift.is_empty() => {}
        Ok(drift) => {
            for d in drift {
                warn!(table = T::TABLE, "Schema drift: {}", d);
            }
        }
        Err(e) => warn!(table = T::TABLE, "Schema check failed: {}", e),
    }
}
