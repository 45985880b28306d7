//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered account.
///
/// Created by signup and never deleted here. Only email confirmation
/// mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Globally unique identifier, generated at signup.
    pub id: Uuid,
    /// Email address. Unique and compared case-sensitively.
    pub email: String,
    /// Salted password digest. `None` disables password login.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Pending confirmation seed. Present until the email is confirmed.
    #[serde(skip_serializing)]
    pub email_confirm_seed: Option<String>,
    /// When the email address was confirmed.
    pub email_confirmed_at: Option<DateTime<Utc>>,
    /// Where the signup came from, if the client said so.
    pub signup_attribution: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the email address has been confirmed.
    pub fn is_confirmed(&self) -> bool {
        self.email_confirmed_at.is_some()
    }

    /// Whether a confirmation seed is still waiting to be consumed.
    pub fn confirmation_pending(&self) -> bool {
        self.email_confirm_seed.is_some() && self.email_confirmed_at.is_none()
    }
}

/// Data required to insert a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Pre-generated identifier.
    pub id: Uuid,
    /// Email address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: Option<String>,
    /// Confirmation seed.
    pub email_confirm_seed: Option<String>,
    /// Signup attribution.
    pub signup_attribution: Option<String>,
}

impl NewUser {
    /// Materialize the row a store would return for this insert.
    pub fn into_user(self, now: DateTime<Utc>) -> User {
        User {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            email_confirm_seed: self.email_confirm_seed,
            email_confirmed_at: None,
            signup_attribution: self.signup_attribution,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Lightweight, session-derived view of the caller.
///
/// `email` is only known when the full record was loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// The account identifier taken from the session.
    pub id: Uuid,
    /// The account email, when known.
    pub email: Option<String>,
}

impl SessionUser {
    /// A view built from the identity reference alone.
    pub fn from_id(id: Uuid) -> Self {
        Self { id, email: None }
    }
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: Some(user.email.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user() -> NewUser {
        NewUser {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            password_hash: Some("digest".to_string()),
            email_confirm_seed: Some(Uuid::new_v4().to_string()),
            signup_attribution: None,
        }
    }

    #[test]
    fn test_new_user_starts_unconfirmed() {
        let user = new_user().into_user(Utc::now());
        assert!(!user.is_confirmed());
        assert!(user.confirmation_pending());
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_serialization_hides_secrets() {
        let user = new_user().into_user(Utc::now());
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("email_confirm_seed").is_none());
        assert_eq!(json["email"], "a@x.com");
        assert!(json["signup_attribution"].is_null());
    }

    #[test]
    fn test_session_user_from_record() {
        let user = new_user().into_user(Utc::now());
        let view = SessionUser::from(&user);
        assert_eq!(view.id, user.id);
        assert_eq!(view.email.as_deref(), Some("a@x.com"));
        assert_eq!(SessionUser::from_id(user.id).email, None);
    }
}
