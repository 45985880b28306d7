//! PostgreSQL connection pool shared by the user store and the session backend.

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::info;

use portcullis_core::config::DatabaseConfig;
use portcullis_core::error::{AppError, ErrorKind};
use portcullis_core::result::AppResult;

/// Name reported in `pg_stat_activity` for every pooled connection.
pub const APPLICATION_NAME: &str = "portcullis";

/// Wrapper around the sqlx PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Create a new database pool from configuration.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let options = connect_options(config)?;
        info!(
            host = options.get_host(),
            port = options.get_port(),
            database = options.get_database().unwrap_or("-"),
            username = options.get_username(),
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = pool_options(config)?
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to connect to database: {e}"),
                    e,
                )
            })?;

        info!("Successfully connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Return a reference to the underlying sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

/// Parse the configured URL and tag connections with [`APPLICATION_NAME`].
pub fn connect_options(config: &DatabaseConfig) -> AppResult<PgConnectOptions> {
    let options = config.url.parse::<PgConnectOptions>().map_err(|e| {
        AppError::with_source(ErrorKind::Configuration, "Invalid database URL", e)
    })?;
    Ok(options.application_name(APPLICATION_NAME))
}

/// Pool sizing and timeouts from configuration.
pub fn pool_options(config: &DatabaseConfig) -> AppResult<PgPoolOptions> {
    if config.max_connections == 0 {
        return Err(AppError::new(
            ErrorKind::Configuration,
            "database.max_connections must be at least 1",
        ));
    }
    if config.min_connections > config.max_connections {
        return Err(AppError::new(
            ErrorKind::Configuration,
            format!(
                "database.min_connections ({}) exceeds max_connections ({})",
                config.min_connections, config.max_connections
            ),
        ));
    }

    Ok(PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds)))
}
