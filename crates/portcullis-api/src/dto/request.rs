//! Request DTOs with validation.
//!
//! Emptiness of email and password is checked by the signup flow itself,
//! so the validators here only bound sizes.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Signup request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    /// Email.
    #[serde(default)]
    #[validate(length(max = 254, message = "Email is too long"))]
    pub email: String,
    /// Password.
    #[serde(default)]
    #[validate(length(max = 1024, message = "Password is too long"))]
    pub password: String,
    /// Where the user came from.
    #[validate(length(max = 255, message = "Attribution is too long"))]
    pub attribution: Option<String>,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email.
    #[serde(default)]
    #[validate(length(max = 254, message = "Email is too long"))]
    pub email: String,
    /// Password.
    #[serde(default)]
    #[validate(length(max = 1024, message = "Password is too long"))]
    pub password: String,
}

/// Query parameters for reading flashes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlashQuery {
    /// Bucket to drain. The default bucket when absent.
    pub bucket: Option<String>,
}
