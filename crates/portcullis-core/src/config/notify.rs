//! Signup notification configuration.

use serde::{Deserialize, Serialize};

/// Settings for the post-signup notification dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Bounded queue size between signup and the delivery worker.
    /// Notifications arriving at a full queue are dropped.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Endpoint receiving a JSON POST per new user. Logged only when unset.
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Timeout for a single webhook delivery in seconds.
    #[serde(default = "default_webhook_timeout")]
    pub webhook_timeout_seconds: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            webhook_url: None,
            webhook_timeout_seconds: default_webhook_timeout(),
        }
    }
}

fn default_queue_capacity() -> usize {
    256
}

fn default_webhook_timeout() -> u64 {
    5
}
