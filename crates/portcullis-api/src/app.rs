//! Application builder and server runner.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use portcullis_auth::NotificationDispatcher;
use portcullis_core::config::{AppConfig, StoreBackend};
use portcullis_core::error::AppError;
use portcullis_core::result::AppResult;
use portcullis_database::{DatabasePool, MemoryUserStore, PgUserStore, UserStore};
use portcullis_session::SessionBackend;
use portcullis_session::memory::MemorySessionBackend;
use portcullis_session::postgres::PgSessionBackend;

use crate::router::build_router;
use crate::state::AppState;

/// How often expired PostgreSQL sessions are purged.
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the Portcullis server until Ctrl-C.
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    info!("Starting Portcullis v{}", env!("CARGO_PKG_VERSION"));

    let needs_db = config.database.backend == StoreBackend::Postgres
        || config.session.backend == StoreBackend::Postgres;

    let db = if needs_db {
        let db = DatabasePool::connect(&config.database).await?;
        if config.database.run_migrations {
            portcullis_database::migration::run_migrations(db.pool()).await?;
        }
        Some(db)
    } else {
        None
    };

    let users: Arc<dyn UserStore> = match (&config.database.backend, &db) {
        (StoreBackend::Postgres, Some(db)) => Arc::new(PgUserStore::new(db.pool().clone())),
        _ => {
            warn!("Using in-memory user store; accounts are lost on restart");
            Arc::new(MemoryUserStore::new())
        }
    };

    let session_backend: Arc<dyn SessionBackend> = match (&config.session.backend, &db) {
        (StoreBackend::Postgres, Some(db)) => {
            let backend = PgSessionBackend::new(db.pool().clone());
            spawn_session_purge(backend.clone());
            Arc::new(backend)
        }
        _ => {
            info!("Using in-memory session backend");
            Arc::new(MemorySessionBackend::new(&config.session))
        }
    };

    let (dispatcher, notify_worker) = NotificationDispatcher::from_config(&config.notify)?;

    let bind_address = config.server.bind_address();
    let state = AppState::new(config, users, session_backend, Arc::new(dispatcher))?;
    let app = build_app(state);

    let listener = TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // The router held the last dispatcher; the worker drains and exits.
    if let Err(e) = notify_worker.await {
        warn!(error = %e, "Notification worker ended abnormally");
    }
    if let Some(db) = db {
        db.close().await;
    }

    info!("Portcullis stopped");
    Ok(())
}

fn spawn_session_purge(backend: PgSessionBackend) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            match backend.purge_expired().await {
                Ok(0) => {}
                Ok(count) => info!(count, "Purged expired sessions"),
                Err(e) => warn!(error = %e, "Failed to purge expired sessions"),
            }
        }
    });
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, starting graceful shutdown...");
}
