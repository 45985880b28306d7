//! In-memory user store using a Tokio mutex for single-process deployments.
//!
//! Writes made through a [`MemoryUserTransaction`] are staged and applied to
//! the shared map only on commit, so a rolled-back or dropped transaction
//! leaves no trace. Suitable for development and tests only.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use portcullis_core::error::AppError;
use portcullis_core::result::AppResult;
use portcullis_entity::user::{NewUser, User};

use crate::store::{UserStore, UserTransaction};

/// Committed rows.
#[derive(Debug, Default)]
struct InnerState {
    users: HashMap<Uuid, User>,
}

impl InnerState {
    /// Reject `user` if any unique column collides with a committed row
    /// or with one of `staged`.
    fn check_unique(&self, staged: &[User], user: &User) -> AppResult<()> {
        for existing in self.users.values().chain(staged.iter()) {
            if existing.id == user.id {
                return Err(AppError::conflict(format!(
                    "User id '{}' already exists",
                    user.id
                )));
            }
            if existing.email == user.email {
                return Err(AppError::conflict("Email already in use"));
            }
            if user.email_confirm_seed.is_some()
                && existing.email_confirm_seed == user.email_confirm_seed
            {
                return Err(AppError::conflict("Confirmation seed already in use"));
            }
        }
        Ok(())
    }
}

/// In-memory [`UserStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    /// Protected committed state.
    state: Arc<Mutex<InnerState>>,
}

impl MemoryUserStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed users.
    pub async fn len(&self) -> usize {
        self.state.lock().await.users.len()
    }

    /// Whether no user has been committed.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_credentialed(
        &self,
        email: &str,
        password_hash: &str,
    ) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| {
                u.email == email
                    && u.password_hash.as_deref() == Some(password_hash)
                    && u.email_confirmed_at.is_some()
            })
            .cloned())
    }

    async fn confirm_email(&self, seed: &str) -> AppResult<Option<User>> {
        let mut state = self.state.lock().await;
        let Some(user) = state.users.values_mut().find(|u| {
            u.email_confirm_seed.as_deref() == Some(seed) && u.email_confirmed_at.is_none()
        }) else {
            return Ok(None);
        };

        let now = Utc::now();
        user.email_confirmed_at = Some(now);
        user.email_confirm_seed = None;
        user.updated_at = now;
        Ok(Some(user.clone()))
    }

    async fn begin(&self) -> AppResult<Box<dyn UserTransaction>> {
        Ok(Box::new(MemoryUserTransaction {
            state: Arc::clone(&self.state),
            staged: Vec::new(),
        }))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// Staged writes against a [`MemoryUserStore`].
#[derive(Debug)]
pub struct MemoryUserTransaction {
    state: Arc<Mutex<InnerState>>,
    staged: Vec<User>,
}

#[async_trait]
impl UserTransaction for MemoryUserTransaction {
    async fn insert_user(&mut self, user: &NewUser) -> AppResult<User> {
        let row = user.clone().into_user(Utc::now());
        self.state.lock().await.check_unique(&self.staged, &row)?;
        self.staged.push(row.clone());
        Ok(row)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let mut state = self.state.lock().await;

        // A concurrent transaction may have committed the same email since
        // insert time.
        for (index, row) in self.staged.iter().enumerate() {
            state.check_unique(&self.staged[..index], row)?;
        }
        let count = self.staged.len();
        for row in self.staged {
            state.users.insert(row.id, row);
        }

        debug!(count, "Committed in-memory user transaction");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        debug!(
            count = self.staged.len(),
            "Rolled back in-memory user transaction"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portcullis_core::error::ErrorKind;

    fn record(email: &str) -> NewUser {
        NewUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: Some("digest".to_string()),
            email_confirm_seed: Some(Uuid::new_v4().to_string()),
            signup_attribution: Some("campaign1".to_string()),
        }
    }

    async fn insert(store: &MemoryUserStore, rec: &NewUser) -> User {
        let mut tx = store.begin().await.unwrap();
        let user = tx.insert_user(rec).await.unwrap();
        tx.commit().await.unwrap();
        user
    }

    #[tokio::test]
    async fn test_staged_rows_invisible_until_commit() {
        let store = MemoryUserStore::new();
        let rec = record("a@x.com");

        let mut tx = store.begin().await.unwrap();
        tx.insert_user(&rec).await.unwrap();
        assert!(store.find_by_id(rec.id).await.unwrap().is_none());

        tx.commit().await.unwrap();
        assert!(store.find_by_id(rec.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_writes() {
        let store = MemoryUserStore::new();
        let rec = record("a@x.com");
        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_user(&rec).await.unwrap();
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_duplicate_email_within_one_transaction() {
        let store = MemoryUserStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_user(&record("a@x.com")).await.unwrap();
        let err = tx.insert_user(&record("a@x.com")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_email_match_is_case_sensitive() {
        let store = MemoryUserStore::new();
        insert(&store, &record("a@x.com")).await;
        assert!(store.find_by_email("A@X.COM").await.unwrap().is_none());
        insert(&store, &record("A@X.COM")).await;
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_find_credentialed_requires_confirmation() {
        let store = MemoryUserStore::new();
        let rec = record("a@x.com");
        let user = insert(&store, &rec).await;

        let found = store.find_credentialed("a@x.com", "digest").await.unwrap();
        assert!(found.is_none());

        let seed = user.email_confirm_seed.clone().unwrap();
        let confirmed = store.confirm_email(&seed).await.unwrap().unwrap();
        assert!(confirmed.is_confirmed());
        assert!(confirmed.email_confirm_seed.is_none());

        let found = store.find_credentialed("a@x.com", "digest").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
        assert!(
            store
                .find_credentialed("a@x.com", "other")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_confirm_email_consumes_seed_once() {
        let store = MemoryUserStore::new();
        let user = insert(&store, &record("a@x.com")).await;
        let seed = user.email_confirm_seed.unwrap();

        assert!(store.confirm_email(&seed).await.unwrap().is_some());
        assert!(store.confirm_email(&seed).await.unwrap().is_none());
        assert!(store.confirm_email("unknown").await.unwrap().is_none());
    }
}
