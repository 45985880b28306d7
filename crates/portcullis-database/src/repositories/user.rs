//! PostgreSQL-backed user store.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use portcullis_core::error::{AppError, ErrorKind};
use portcullis_core::result::AppResult;
use portcullis_entity::user::{NewUser, User};

use crate::store::{UserStore, UserTransaction};

/// Repository for user lookups and account transactions.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new user store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to find user by id", e))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to find user by email", e)
            })
    }

    async fn find_credentialed(
        &self,
        email: &str,
        password_hash: &str,
    ) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users \
             WHERE email = $1 AND password_hash = $2 AND email_confirmed_at IS NOT NULL",
        )
        .bind(email)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to look up credentials", e)
        })
    }

    async fn confirm_email(&self, seed: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users \
             SET email_confirmed_at = NOW(), email_confirm_seed = NULL, updated_at = NOW() \
             WHERE email_confirm_seed = $1 AND email_confirmed_at IS NULL \
             RETURNING *",
        )
        .bind(seed)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to confirm email", e))
    }

    async fn begin(&self) -> AppResult<Box<dyn UserTransaction>> {
        let tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to begin transaction", e)
        })?;
        Ok(Box::new(PgUserTransaction { tx }))
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Health check failed", e))
    }
}

/// An open PostgreSQL transaction for account writes.
pub struct PgUserTransaction {
    tx: Transaction<'static, Postgres>,
}

impl std::fmt::Debug for PgUserTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgUserTransaction").finish_non_exhaustive()
    }
}

#[async_trait]
impl UserTransaction for PgUserTransaction {
    async fn insert_user(&mut self, user: &NewUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, password_hash, email_confirm_seed, signup_attribution) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING *",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.email_confirm_seed)
        .bind(&user.signup_attribution)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_insert_error)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to commit transaction", e)
        })?;
        debug!("Committed user transaction");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.tx.rollback().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to roll back transaction", e)
        })
    }
}

/// Classify an insert failure, separating uniqueness violations from faults.
fn map_insert_error(err: sqlx::Error) -> AppError {
    let constraint = err
        .as_database_error()
        .filter(|db| db.is_unique_violation())
        .map(|db| db.constraint().unwrap_or_default().to_string());

    match constraint.as_deref() {
        Some("users_email_key") => {
            AppError::with_source(ErrorKind::Conflict, "Email already in use", err)
        }
        Some("users_email_confirm_seed_key") => AppError::with_source(
            ErrorKind::Conflict,
            "Confirmation seed already in use",
            err,
        ),
        Some(_) => AppError::with_source(ErrorKind::Conflict, "User already exists", err),
        None => AppError::with_source(ErrorKind::Storage, "Failed to create user", err),
    }
}
