//! Shared fixtures for unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use portcullis_core::config::HashingConfig;
use portcullis_core::error::AppError;
use portcullis_core::result::AppResult;
use portcullis_database::{MemoryUserStore, UserStore, UserTransaction};
use portcullis_entity::session::SessionData;
use portcullis_entity::user::{NewUser, User};
use portcullis_session::memory::MemorySessionBackend;
use portcullis_session::{SessionBackend, SessionStore};

use crate::notify::SignupNotifier;
use crate::password::CredentialHasher;

pub(crate) fn cheap_hasher() -> CredentialHasher {
    let hashing = HashingConfig {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    };
    CredentialHasher::new("test-pepper", &hashing).unwrap()
}

pub(crate) fn session_store() -> SessionStore {
    SessionStore::new(
        Arc::new(MemorySessionBackend::with_capacity(1_000)),
        Duration::from_secs(60),
    )
}

pub(crate) fn broken_session_store() -> SessionStore {
    SessionStore::new(Arc::new(BrokenSessionBackend), Duration::from_secs(60))
}

/// Insert and confirm a user holding `password_hash`.
pub(crate) async fn confirmed_user(store: &MemoryUserStore, email: &str, password_hash: &str) -> User {
    let seed = Uuid::new_v4().to_string();
    let mut tx = store.begin().await.unwrap();
    tx.insert_user(&NewUser {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: Some(password_hash.to_string()),
        email_confirm_seed: Some(seed.clone()),
        signup_attribution: None,
    })
    .await
    .unwrap();
    tx.commit().await.unwrap();
    store.confirm_email(&seed).await.unwrap().unwrap()
}

/// Session backend that fails every call.
#[derive(Debug)]
pub(crate) struct BrokenSessionBackend;

#[async_trait]
impl SessionBackend for BrokenSessionBackend {
    async fn load(&self, _id: &str) -> AppResult<Option<SessionData>> {
        Err(AppError::storage("session backend offline"))
    }

    async fn store(&self, _id: &str, _data: &SessionData, _ttl: Duration) -> AppResult<()> {
        Err(AppError::storage("session backend offline"))
    }

    async fn destroy(&self, _id: &str) -> AppResult<()> {
        Err(AppError::storage("session backend offline"))
    }
}

/// User store whose every call fails with a storage error.
#[derive(Debug)]
pub(crate) struct FailingUserStore;

#[async_trait]
impl UserStore for FailingUserStore {
    async fn find_by_id(&self, _id: Uuid) -> AppResult<Option<User>> {
        Err(AppError::storage("connection reset"))
    }

    async fn find_by_email(&self, _email: &str) -> AppResult<Option<User>> {
        Err(AppError::storage("connection reset"))
    }

    async fn find_credentialed(&self, _email: &str, _hash: &str) -> AppResult<Option<User>> {
        Err(AppError::storage("connection reset"))
    }

    async fn confirm_email(&self, _seed: &str) -> AppResult<Option<User>> {
        Err(AppError::storage("connection reset"))
    }

    async fn begin(&self) -> AppResult<Box<dyn UserTransaction>> {
        Err(AppError::storage("connection reset"))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Err(AppError::storage("connection reset"))
    }
}

/// Records every notified user.
#[derive(Debug, Default)]
pub(crate) struct RecordingNotifier {
    pub(crate) users: Mutex<Vec<User>>,
}

impl RecordingNotifier {
    pub(crate) fn notified(&self) -> Vec<User> {
        self.users.lock().map(|u| u.clone()).unwrap_or_default()
    }
}

impl SignupNotifier for RecordingNotifier {
    fn notify_new_user(&self, user: &User) {
        if let Ok(mut users) = self.users.lock() {
            users.push(user.clone());
        }
    }
}
