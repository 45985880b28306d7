//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Session key holding the identity reference.
    #[serde(default = "default_identity_key")]
    pub identity_key: String,
    /// Where anonymous callers of protected routes, and every logout, are sent.
    #[serde(default = "default_anonymous_redirect")]
    pub anonymous_redirect: String,
    /// Server-wide secret mixed into every per-account salt.
    ///
    /// Changing it invalidates every stored password hash.
    #[serde(default)]
    pub password_pepper: String,
    /// Whether identity resolution loads the full user record.
    ///
    /// When `false` the identity reference alone marks the request as
    /// logged in and no database lookup happens.
    #[serde(default = "default_true")]
    pub load_user_record: bool,
    /// Argon2 cost parameters for password digests.
    ///
    /// They are part of every digest, so changing them also invalidates
    /// stored hashes.
    #[serde(default)]
    pub hashing: HashingConfig,
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashingConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Number of passes.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            identity_key: default_identity_key(),
            anonymous_redirect: default_anonymous_redirect(),
            password_pepper: String::new(),
            load_user_record: true,
            hashing: HashingConfig::default(),
        }
    }
}

fn default_identity_key() -> String {
    "user".to_string()
}

fn default_anonymous_redirect() -> String {
    "/".to_string()
}

fn default_true() -> bool {
    true
}

fn default_memory_kib() -> u32 {
    19 * 1024
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}
