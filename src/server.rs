//! HTTP server initialization and runtime setup.
//!
//! Opens the configured store, wires the engine and serves the Axum router
//! until Ctrl+C or SIGTERM.

use crate::config::Config;
use crate::domain::repositories::PersistenceStore;
use crate::infrastructure::persistence::{MemoryStore, PgStore};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;

/// Opens the store selected by `config`.
///
/// PostgreSQL when a database URL is configured (migrations are applied on
/// open), the in-memory store otherwise.
pub async fn open_store(config: &Config) -> Result<Arc<dyn PersistenceStore>> {
    let store: Arc<dyn PersistenceStore> = match config.database_url {
        Some(ref url) => {
            let store = PgStore::connect(url, &config.pool_settings())
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, links are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    store.open().await.context("Failed to open store")?;
    Ok(store)
}

/// Runs the HTTP server with the given configuration.
///
/// # Errors
///
/// Returns an error if:
/// - The store cannot be opened
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let store = open_store(&config).await?;
    let state = AppState::from_config(store.clone(), &config);

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await?;
    tracing::info!("Store closed, shutting down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
