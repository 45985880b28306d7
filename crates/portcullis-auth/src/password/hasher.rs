//! Argon2id credential hashing with an email-derived salt.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHasher as ArgonHasher, SaltString},
};
use sha2::{Digest, Sha256};

use portcullis_core::config::{AuthConfig, HashingConfig};
use portcullis_core::error::AppError;

/// Hashes `(email, password)` pairs into PHC strings.
///
/// The salt is derived from the email and a server-wide pepper, so the same
/// pair always produces the same digest and login can match digests by
/// equality. Different emails never share a salt.
#[derive(Clone)]
pub struct CredentialHasher {
    /// Server-wide secret mixed into every salt.
    pepper: Vec<u8>,
    /// Argon2 cost parameters.
    params: Params,
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl CredentialHasher {
    /// Creates a hasher from a pepper and explicit cost parameters.
    pub fn new(pepper: &str, hashing: &HashingConfig) -> Result<Self, AppError> {
        let params = Params::new(
            hashing.memory_kib,
            hashing.iterations,
            hashing.parallelism,
            None,
        )
        .map_err(|e| AppError::configuration(format!("Invalid Argon2 parameters: {e}")))?;

        Ok(Self {
            pepper: pepper.as_bytes().to_vec(),
            params,
        })
    }

    /// Creates a hasher from auth configuration.
    pub fn from_config(config: &AuthConfig) -> Result<Self, AppError> {
        Self::new(&config.password_pepper, &config.hashing)
    }

    /// Hashes a password for the given email.
    ///
    /// Never fails for well-formed strings; the error path only covers
    /// Argon2 rejecting its own inputs.
    pub fn hash(&self, email: &str, password: &str) -> Result<String, AppError> {
        let salt = self.salt_for(email)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// First 16 bytes of `SHA-256(pepper || 0x00 || email)`.
    fn salt_for(&self, email: &str) -> Result<SaltString, AppError> {
        let mut hasher = Sha256::new();
        hasher.update(&self.pepper);
        hasher.update([0u8]);
        hasher.update(email.as_bytes());
        let digest = hasher.finalize();

        SaltString::encode_b64(&digest[..16])
            .map_err(|e| AppError::internal(format!("Salt encoding failed: {e}")))
    }
}
