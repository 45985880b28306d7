//! PostgreSQL session backend over the `sessions` table.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::debug;

use portcullis_core::error::{AppError, ErrorKind};
use portcullis_core::result::AppResult;
use portcullis_entity::session::SessionData;

use crate::backend::SessionBackend;

/// Session backend storing bags as JSONB rows with an expiry timestamp.
#[derive(Debug, Clone)]
pub struct PgSessionBackend {
    pool: PgPool,
}

impl PgSessionBackend {
    /// Create a new backend over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete all expired sessions, returning how many rows were removed.
    pub async fn purge_expired(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to purge expired sessions", e)
            })?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SessionBackend for PgSessionBackend {
    async fn load(&self, id: &str) -> AppResult<Option<SessionData>> {
        let row = sqlx::query_scalar::<_, Json<SessionData>>(
            "SELECT data FROM sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to load session", e))?;

        Ok(row.map(|Json(data)| data))
    }

    async fn store(&self, id: &str, data: &SessionData, ttl: Duration) -> AppResult<()> {
        let ttl = chrono::Duration::from_std(ttl).map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Session lifetime out of range", e)
        })?;
        let expires_at = Utc::now() + ttl;

        sqlx::query(
            "INSERT INTO sessions (id, data, expires_at, updated_at) \
             VALUES ($1, $2, $3, NOW()) \
             ON CONFLICT (id) DO UPDATE \
             SET data = EXCLUDED.data, expires_at = EXCLUDED.expires_at, updated_at = NOW()",
        )
        .bind(id)
        .bind(Json(data))
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to store session", e))?;

        debug!(session_id = id, %expires_at, "Stored session");
        Ok(())
    }

    async fn destroy(&self, id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to delete session", e)
            })?;
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Health check failed", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use serde_json::json;

    fn bag(user: &str) -> SessionData {
        let mut data = SessionData::default();
        data.values.insert("user_id".to_string(), json!(user));
        data
    }

    async fn expires_at(pool: &PgPool, id: &str) -> DateTime<Utc> {
        sqlx::query_scalar::<_, DateTime<Utc>>("SELECT expires_at FROM sessions WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn insert_expired(pool: &PgPool, id: &str) {
        sqlx::query(
            "INSERT INTO sessions (id, data, expires_at) \
             VALUES ($1, $2, NOW() - INTERVAL '1 minute')",
        )
        .bind(id)
        .bind(Json(bag("stale")))
        .execute(pool)
        .await
        .unwrap();
    }

    #[sqlx::test(migrator = "portcullis_database::migration::MIGRATOR")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_store_load_destroy(pool: PgPool) {
        let backend = PgSessionBackend::new(pool);
        assert!(backend.load("s1").await.unwrap().is_none());

        backend
            .store("s1", &bag("u1"), Duration::from_secs(600))
            .await
            .unwrap();
        assert_eq!(backend.load("s1").await.unwrap(), Some(bag("u1")));

        backend
            .store("s1", &bag("u2"), Duration::from_secs(600))
            .await
            .unwrap();
        assert_eq!(backend.load("s1").await.unwrap(), Some(bag("u2")));

        backend.destroy("s1").await.unwrap();
        assert!(backend.load("s1").await.unwrap().is_none());
        backend.destroy("s1").await.unwrap();
        assert!(backend.health_check().await.unwrap());
    }

    #[sqlx::test(migrator = "portcullis_database::migration::MIGRATOR")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_expired_rows_are_not_loaded(pool: PgPool) {
        let backend = PgSessionBackend::new(pool.clone());
        insert_expired(&pool, "old").await;

        assert!(backend.load("old").await.unwrap().is_none());
    }

    #[sqlx::test(migrator = "portcullis_database::migration::MIGRATOR")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_store_slides_expiry(pool: PgPool) {
        let backend = PgSessionBackend::new(pool.clone());

        backend
            .store("s1", &bag("u1"), Duration::from_secs(60))
            .await
            .unwrap();
        let first = expires_at(&pool, "s1").await;

        backend
            .store("s1", &bag("u1"), Duration::from_secs(3600))
            .await
            .unwrap();
        let second = expires_at(&pool, "s1").await;

        assert!(second - first >= chrono::Duration::minutes(55));
    }

    #[sqlx::test(migrator = "portcullis_database::migration::MIGRATOR")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_purge_removes_only_expired(pool: PgPool) {
        let backend = PgSessionBackend::new(pool.clone());
        insert_expired(&pool, "old-1").await;
        insert_expired(&pool, "old-2").await;
        backend
            .store("live", &bag("u1"), Duration::from_secs(600))
            .await
            .unwrap();

        assert_eq!(backend.purge_expired().await.unwrap(), 2);
        assert_eq!(backend.purge_expired().await.unwrap(), 0);
        assert_eq!(backend.load("live").await.unwrap(), Some(bag("u1")));
    }
}
