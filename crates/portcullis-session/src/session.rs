//! The per-request session handle.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use portcullis_core::error::{AppError, ErrorKind};
use portcullis_core::result::AppResult;
use portcullis_entity::session::{Flash, SessionData};

use crate::backend::SessionBackend;

/// Mutable per-request view of the bag.
#[derive(Debug)]
struct SessionState {
    /// Backend id, `None` until the first successful save of a new session.
    id: Option<String>,
    data: SessionData,
    /// Id detached by `cycle_id`, destroyed once a save under the new id succeeds.
    retired_id: Option<String>,
    /// Set by every successful save; the client's cookie must be refreshed.
    saved: bool,
}

/// Handle to one client's session for the duration of a request.
///
/// Cloning is cheap and every clone sees the same bag. Mutations are
/// visible immediately to the rest of the request but reach the backend
/// only on [`save`](Self::save). Concurrent requests for the same client
/// each work on their own copy; the last save wins.
#[derive(Debug, Clone)]
pub struct Session {
    state: Arc<Mutex<SessionState>>,
    backend: Arc<dyn SessionBackend>,
    ttl: Duration,
}

impl Session {
    pub(crate) fn new(
        backend: Arc<dyn SessionBackend>,
        ttl: Duration,
        id: Option<String>,
        data: SessionData,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState {
                id,
                data,
                retired_id: None,
                saved: false,
            })),
            backend,
            ttl,
        }
    }

    /// The backend id, if the session has been persisted.
    pub async fn id(&self) -> Option<String> {
        self.state.lock().await.id.clone()
    }

    /// The id persisted during this request, if any save succeeded.
    ///
    /// The client's cookie must be (re)issued with it: either the id is new
    /// or its backend lifetime was just extended.
    pub async fn saved_id(&self) -> Option<String> {
        let state = self.state.lock().await;
        if state.saved { state.id.clone() } else { None }
    }

    /// Read and deserialize a value.
    ///
    /// A stored value of the wrong shape is an `ErrorKind::Serialization`
    /// error rather than `None`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let state = self.state.lock().await;
        match state.data.values.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    /// Whether a value is stored under `key`.
    pub async fn contains_key(&self, key: &str) -> bool {
        self.state.lock().await.data.values.contains_key(key)
    }

    /// Set a value, replacing any previous one.
    pub async fn insert<T: Serialize>(&self, key: &str, value: T) -> AppResult<()> {
        let value = serde_json::to_value(value)?;
        self.state
            .lock()
            .await
            .data
            .values
            .insert(key.to_string(), value);
        Ok(())
    }

    /// Remove a value. Returns whether anything was removed.
    pub async fn remove(&self, key: &str) -> bool {
        self.state.lock().await.data.values.remove(key).is_some()
    }

    /// Append a flash to `bucket`. Not persisted until the next save.
    pub async fn add_flash(&self, flash: Flash, bucket: &str) {
        self.state.lock().await.data.push_flash(bucket, flash);
    }

    /// Remove and return every flash in `bucket`.
    pub async fn flashes(&self, bucket: &str) -> Vec<Flash> {
        self.state.lock().await.data.take_flashes(bucket)
    }

    /// Detach from the current id so the next save issues a fresh one.
    ///
    /// The bag is kept. The old backend entry stays in place until a save
    /// under the new id succeeds, so a failed save leaves the client's
    /// existing session intact.
    pub async fn cycle_id(&self) {
        let mut state = self.state.lock().await;
        if let Some(old) = state.id.take() {
            state.retired_id.get_or_insert(old);
            state.saved = false;
        }
    }

    /// Persist the bag, assigning an id first if the session is new.
    ///
    /// A new session with nothing in it is not written. The id, and the
    /// destruction of any id retired by [`cycle_id`](Self::cycle_id), only
    /// take effect once the backend accepted the write.
    pub async fn save(&self) -> AppResult<()> {
        let (id, data) = {
            let state = self.state.lock().await;
            if state.id.is_none() && state.data.is_empty() {
                return Ok(());
            }
            let id = state
                .id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            (id, state.data.clone())
        };

        self.backend
            .store(&id, &data, self.ttl)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Persistence, "Failed to save session", e))?;

        let retired = {
            let mut state = self.state.lock().await;
            state.id = Some(id.clone());
            state.saved = true;
            state.retired_id.take()
        };

        if let Some(old) = retired {
            if let Err(e) = self.backend.destroy(&old).await {
                warn!(error = %e, "Failed to destroy previous session");
            }
        }

        debug!(session_id = %id, "Session saved");
        Ok(())
    }
}
