//! Opens [`Session`] handles against the configured backend.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use uuid::Uuid;

use portcullis_entity::session::SessionData;

use crate::backend::SessionBackend;
use crate::session::Session;

/// Factory for per-request sessions.
#[derive(Debug, Clone)]
pub struct SessionStore {
    backend: Arc<dyn SessionBackend>,
    ttl: Duration,
}

impl SessionStore {
    /// Create a store over a backend with the given session lifetime.
    pub fn new(backend: Arc<dyn SessionBackend>, ttl: Duration) -> Self {
        Self { backend, ttl }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &Arc<dyn SessionBackend> {
        &self.backend
    }

    /// A new, empty session with no id.
    pub fn fresh(&self) -> Session {
        Session::new(Arc::clone(&self.backend), self.ttl, None, SessionData::default())
    }

    /// Open the session named by a client-supplied id.
    ///
    /// Never fails: a missing, malformed, unknown, or expired id and a
    /// backend error all produce a fresh session. Backend errors are logged.
    pub async fn load(&self, id: Option<&str>) -> Session {
        let Some(id) = id else {
            return self.fresh();
        };
        if Uuid::parse_str(id).is_err() {
            debug!("Ignoring malformed session id");
            return self.fresh();
        }

        match self.backend.load(id).await {
            Ok(Some(data)) => Session::new(
                Arc::clone(&self.backend),
                self.ttl,
                Some(id.to_string()),
                data,
            ),
            Ok(None) => self.fresh(),
            Err(e) => {
                warn!(error = %e, "Failed to load session, starting a fresh one");
                self.fresh()
            }
        }
    }
}
