//! In-memory session backend using the moka crate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use tracing::debug;

use portcullis_core::config::SessionConfig;
use portcullis_core::result::AppResult;
use portcullis_entity::session::SessionData;

use crate::backend::SessionBackend;

/// A bag together with the lifetime it was stored with.
#[derive(Debug, Clone)]
struct StoredSession {
    data: SessionData,
    ttl: Duration,
}

/// Expires each entry `ttl` after its latest store.
#[derive(Debug, Clone, Copy)]
struct StoredTtl;

impl Expiry<String, StoredSession> for StoredTtl {
    fn expire_after_create(
        &self,
        _id: &String,
        value: &StoredSession,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _id: &String,
        value: &StoredSession,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-memory session backend.
///
/// Each entry expires `ttl` after the store that wrote it, so every save
/// slides the session's lifetime.
#[derive(Debug, Clone)]
pub struct MemorySessionBackend {
    cache: Cache<String, StoredSession>,
}

impl MemorySessionBackend {
    /// Create a new in-memory backend from configuration.
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_capacity(config.memory_capacity)
    }

    /// Create a backend holding at most `max_capacity` sessions.
    pub fn with_capacity(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(StoredTtl)
            .build();
        Self { cache }
    }

    /// Number of live sessions (approximate until pending tasks run).
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl SessionBackend for MemorySessionBackend {
    async fn load(&self, id: &str) -> AppResult<Option<SessionData>> {
        Ok(self.cache.get(id).await.map(|stored| stored.data))
    }

    async fn store(&self, id: &str, data: &SessionData, ttl: Duration) -> AppResult<()> {
        let stored = StoredSession {
            data: data.clone(),
            ttl,
        };
        self.cache.insert(id.to_string(), stored).await;
        debug!(session_id = id, ttl_secs = ttl.as_secs(), "Stored in-memory session");
        Ok(())
    }

    async fn destroy(&self, id: &str) -> AppResult<()> {
        self.cache.invalidate(id).await;
        Ok(())
    }
}
