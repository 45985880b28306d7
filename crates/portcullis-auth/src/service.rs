//! Account flows: signup, login, logout, and email confirmation.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use portcullis_core::config::AuthConfig;
use portcullis_core::error::AppError;
use portcullis_core::result::AppResult;
use portcullis_database::{UserStore, transact};
use portcullis_entity::user::{NewUser, User};
use portcullis_session::Session;

use crate::notify::SignupNotifier;
use crate::password::CredentialHasher;

/// Orchestrates the account flows over the user store and the session.
#[derive(Clone)]
pub struct AuthService {
    /// User records.
    users: Arc<dyn UserStore>,
    /// Credential hasher.
    hasher: CredentialHasher,
    /// Post-commit signup hook.
    notifier: Arc<dyn SignupNotifier>,
    /// Session key holding the identity reference.
    identity_key: String,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("users", &self.users)
            .field("identity_key", &self.identity_key)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    /// Creates a new auth service with all required dependencies.
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: CredentialHasher,
        notifier: Arc<dyn SignupNotifier>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            users,
            hasher,
            notifier,
            identity_key: config.identity_key.clone(),
        }
    }

    /// The user store backing this service.
    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.users
    }

    /// Create an account.
    ///
    /// The insert runs in its own transaction. The notifier is only told
    /// about the user once that transaction has committed, and is never
    /// awaited. Empty email or password is a validation error and creates
    /// nothing. An empty attribution is stored as no attribution.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        attribution: Option<&str>,
    ) -> AppResult<User> {
        if email.is_empty() || password.is_empty() {
            return Err(AppError::validation("Not enough data"));
        }

        let record = NewUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: Some(self.hasher.hash(email, password)?),
            email_confirm_seed: Some(Uuid::new_v4().to_string()),
            signup_attribution: attribution
                .filter(|a| !a.is_empty())
                .map(str::to_string),
        };

        let user = transact(self.users.as_ref(), move |tx| {
            Box::pin(async move { tx.insert_user(&record).await })
        })
        .await?;

        info!(user_id = %user.id, "User signed up");
        self.notifier.notify_new_user(&user);
        Ok(user)
    }

    /// Authenticate and bind the identity to the session.
    ///
    /// Unknown email, wrong password, and unconfirmed email all produce the
    /// same credential error. Lookup faults propagate as storage errors and
    /// a failed session save as a persistence error.
    pub async fn login(&self, session: &Session, email: &str, password: &str) -> AppResult<User> {
        let digest = self.hasher.hash(email, password)?;

        let Some(user) = self.users.find_credentialed(email, &digest).await? else {
            debug!("Login rejected");
            return Err(AppError::bad_credentials());
        };

        session.cycle_id().await;
        session.insert(&self.identity_key, user.id.to_string()).await?;
        session.save().await?;

        info!(user_id = %user.id, "Login successful");
        Ok(user)
    }

    /// Remove the identity from the session.
    ///
    /// Returns `false` when there was nothing to do. A save failure is
    /// logged; callers redirect either way.
    pub async fn logout(&self, session: &Session) -> bool {
        if !session.remove(&self.identity_key).await {
            return false;
        }

        if let Err(e) = session.save().await {
            warn!(error = %e, "Failed to save session on logout");
        } else {
            info!("Logout successful");
        }
        true
    }

    /// Consume a confirmation seed.
    pub async fn confirm_email(&self, seed: &str) -> AppResult<User> {
        let user = self
            .users
            .confirm_email(seed)
            .await?
            .ok_or_else(|| AppError::not_found("Unknown or already used confirmation link"))?;

        info!(user_id = %user.id, "Email confirmed");
        Ok(user)
    }
}
