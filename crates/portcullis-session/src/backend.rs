//! Storage seam for session bags.

use std::time::Duration;

use async_trait::async_trait;

use portcullis_core::result::AppResult;
use portcullis_entity::session::SessionData;

/// Persists session bags by id.
///
/// Implementations must be thread-safe (`Send + Sync`) and usable behind
/// an `Arc<dyn SessionBackend>`.
#[async_trait]
pub trait SessionBackend: Send + Sync + std::fmt::Debug + 'static {
    /// Load a session bag. Unknown and expired ids yield `None`.
    async fn load(&self, id: &str) -> AppResult<Option<SessionData>>;

    /// Create or replace a session bag, resetting its lifetime to `ttl`.
    async fn store(&self, id: &str, data: &SessionData, ttl: Duration) -> AppResult<()>;

    /// Delete a session bag. Deleting an unknown id is not an error.
    async fn destroy(&self, id: &str) -> AppResult<()>;

    /// Check if the backend is reachable.
    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
