//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use portcullis_entity::user::User;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// User summary for responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// User ID.
    pub id: Uuid,
    /// Email.
    pub email: String,
    /// Whether the email has been confirmed.
    pub email_confirmed: bool,
    /// When the email was confirmed.
    pub email_confirmed_at: Option<DateTime<Utc>>,
    /// Signup attribution.
    pub signup_attribution: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            email_confirmed: user.is_confirmed(),
            email_confirmed_at: user.email_confirmed_at,
            signup_attribution: user.signup_attribution.clone(),
            created_at: user.created_at,
        }
    }
}

/// The caller as seen by the identity middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityResponse {
    /// Whether the request is authenticated.
    pub is_logged_in: bool,
    /// User id from the session, when logged in.
    pub user_id: Option<Uuid>,
    /// Loaded user record, when available.
    pub user: Option<UserResponse>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: String,
    /// Application version.
    pub version: String,
    /// Whether the user store answered.
    pub database: bool,
    /// Whether the session backend answered.
    pub sessions: bool,
}
