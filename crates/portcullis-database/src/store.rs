//! The user-record store seam consumed by the authentication core.

use async_trait::async_trait;
use uuid::Uuid;

use portcullis_core::result::AppResult;
use portcullis_entity::user::{NewUser, User};

/// Read access to user records plus a way to open a write transaction.
///
/// Lookups return `Ok(None)` for "no rows"; every other failure is an
/// `ErrorKind::Storage` error and must not be mistaken for an absent row.
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a user by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by exact (case-sensitive) email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find the confirmed user whose email and password digest both match.
    async fn find_credentialed(&self, email: &str, password_hash: &str)
    -> AppResult<Option<User>>;

    /// Consume a pending confirmation seed, marking the email confirmed.
    ///
    /// Returns `None` when no unconfirmed user holds the seed.
    async fn confirm_email(&self, seed: &str) -> AppResult<Option<User>>;

    /// Open a transaction for account writes.
    async fn begin(&self) -> AppResult<Box<dyn UserTransaction>>;

    /// Check that the store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

/// A write transaction against the user store.
///
/// Dropping a transaction without calling [`commit`](Self::commit)
/// discards its writes.
#[async_trait]
pub trait UserTransaction: Send {
    /// Insert a user row and return it as stored.
    ///
    /// A uniqueness violation on id, email, or seed is `ErrorKind::Conflict`.
    async fn insert_user(&mut self, user: &NewUser) -> AppResult<User>;

    /// Make every write in this transaction durable.
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// Discard every write in this transaction.
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}
