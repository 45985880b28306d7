//! Schema migrations for the `users` and `sessions` tables.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::{debug, info};

use portcullis_core::error::{AppError, ErrorKind};
use portcullis_core::result::AppResult;

/// Embedded migrations from the workspace `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Tables the stores read and write.
pub const REQUIRED_TABLES: [&str; 2] = ["users", "sessions"];

/// Apply pending migrations, then confirm the stores' tables exist.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    info!(known = MIGRATOR.iter().count(), "Running database migrations");
    for migration in MIGRATOR.iter() {
        debug!(
            version = migration.version,
            description = %migration.description,
            "Embedded migration"
        );
    }

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    verify_schema(pool).await?;
    info!("Database migrations completed successfully");
    Ok(())
}

/// Fail unless every table in [`REQUIRED_TABLES`] is present.
pub async fn verify_schema(pool: &PgPool) -> AppResult<()> {
    for table in REQUIRED_TABLES {
        let present = sqlx::query_scalar::<_, bool>("SELECT to_regclass($1) IS NOT NULL")
            .bind(table)
            .fetch_one(pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to inspect schema", e)
            })?;

        if !present {
            return Err(AppError::new(
                ErrorKind::Storage,
                format!("Table `{table}` is missing after migrations"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_users_migrate_before_sessions() {
        let descriptions: Vec<String> = MIGRATOR
            .iter()
            .map(|m| m.description.to_string())
            .collect();
        assert_eq!(descriptions, vec!["create users", "create sessions"]);

        let versions: Vec<i64> = MIGRATOR.iter().map(|m| m.version).collect();
        assert!(versions.windows(2).all(|w| w[0] < w[1]));
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_run_migrations_creates_tables(pool: PgPool) {
        assert_eq!(
            verify_schema(&pool).await.unwrap_err().kind,
            ErrorKind::Storage
        );

        run_migrations(&pool).await.unwrap();
        verify_schema(&pool).await.unwrap();

        // A second run has nothing left to apply.
        run_migrations(&pool).await.unwrap();
    }
}
