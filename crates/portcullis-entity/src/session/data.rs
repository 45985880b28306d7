//! The per-client session bag.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::flash::Flash;

/// Serializable contents of one client's session.
///
/// Values are stored as JSON so any serde type fits. Flashes live in their
/// own map, keyed by bucket, so draining a bucket never touches `values`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// Named values, including the identity reference.
    #[serde(default)]
    pub values: BTreeMap<String, serde_json::Value>,
    /// Pending flash messages by bucket.
    #[serde(default)]
    pub flashes: BTreeMap<String, Vec<Flash>>,
}

impl SessionData {
    /// Whether the bag holds nothing worth persisting.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.flashes.values().all(Vec::is_empty)
    }

    /// Append a flash to `bucket`.
    pub fn push_flash(&mut self, bucket: &str, flash: Flash) {
        self.flashes.entry(bucket.to_string()).or_default().push(flash);
    }

    /// Remove and return every flash in `bucket`.
    pub fn take_flashes(&mut self, bucket: &str) -> Vec<Flash> {
        self.flashes.remove(bucket).unwrap_or_default()
    }
}
