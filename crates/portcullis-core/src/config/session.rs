//! Session cookie and backend configuration.

use serde::{Deserialize, Serialize};

use super::StoreBackend;

/// Session management configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Where session bags are persisted.
    #[serde(default)]
    pub backend: StoreBackend,
    /// Name of the cookie carrying the session id.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Session lifetime in minutes, refreshed on every save.
    #[serde(default = "default_ttl")]
    pub ttl_minutes: u64,
    /// Whether the cookie is marked `Secure`.
    #[serde(default)]
    pub secure_cookie: bool,
    /// Maximum number of sessions kept by the in-memory backend.
    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            cookie_name: default_cookie_name(),
            ttl_minutes: default_ttl(),
            secure_cookie: false,
            memory_capacity: default_memory_capacity(),
        }
    }
}

impl SessionConfig {
    /// Session lifetime as a [`std::time::Duration`].
    pub fn ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.ttl_minutes * 60)
    }
}

fn default_cookie_name() -> String {
    "portcullis_session".to_string()
}

fn default_ttl() -> u64 {
    60 * 24 * 30
}

fn default_memory_capacity() -> u64 {
    100_000
}
