//! Per-request identity resolution.
//!
//! The session only carries an identity reference. [`IdentityResolver`]
//! turns it into a [`CurrentUser`] once per request, degrading to
//! anonymous on any failure.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use portcullis_core::config::AuthConfig;
use portcullis_core::error::{AppError, ErrorKind};
use portcullis_core::result::AppResult;
use portcullis_database::UserStore;
use portcullis_entity::user::{SessionUser, User};
use portcullis_session::Session;

/// The resolved identity of the current request.
///
/// Built at most once per request and read-only afterwards. `db_user` may
/// be absent even when logged in if record loading is disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    /// Whether the request is authenticated.
    pub is_logged_in: bool,
    /// Lightweight view derived from the session.
    pub user: Option<SessionUser>,
    /// The full user record, when loaded.
    pub db_user: Option<User>,
}

impl CurrentUser {
    /// The anonymous caller.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A caller identified by reference only.
    pub fn from_reference(id: Uuid) -> Self {
        Self {
            is_logged_in: true,
            user: Some(SessionUser::from_id(id)),
            db_user: None,
        }
    }

    /// A caller backed by a loaded record.
    pub fn from_record(user: User) -> Self {
        Self {
            is_logged_in: true,
            user: Some(SessionUser::from(&user)),
            db_user: Some(user),
        }
    }

    /// The caller's user id, if logged in.
    pub fn user_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.id)
    }
}

/// Resolves a session's identity reference into a [`CurrentUser`].
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    users: Arc<dyn UserStore>,
    identity_key: String,
    load_user_record: bool,
}

impl IdentityResolver {
    /// Creates a resolver over the user store.
    pub fn new(users: Arc<dyn UserStore>, config: &AuthConfig) -> Self {
        Self {
            users,
            identity_key: config.identity_key.clone(),
            load_user_record: config.load_user_record,
        }
    }

    /// Session key holding the identity reference.
    pub fn identity_key(&self) -> &str {
        &self.identity_key
    }

    /// Resolve the caller. Never fails.
    ///
    /// No reference means anonymous without touching the store. A reference
    /// that cannot be bound (malformed, unknown, or the lookup errored) is
    /// logged and also yields anonymous.
    pub async fn resolve(&self, session: &Session) -> CurrentUser {
        let reference = match session.get::<String>(&self.identity_key).await {
            Ok(Some(reference)) => reference,
            Ok(None) => return CurrentUser::anonymous(),
            Err(e) => {
                warn!(error = %e, "Unreadable identity reference, treating request as anonymous");
                return CurrentUser::anonymous();
            }
        };

        match self.bind(&reference).await {
            Ok(current) => current,
            Err(e) => {
                warn!(
                    error = %e,
                    "Failed to bind identity, auth won't be established for this request"
                );
                CurrentUser::anonymous()
            }
        }
    }

    async fn bind(&self, reference: &str) -> AppResult<CurrentUser> {
        let id = Uuid::parse_str(reference).map_err(|e| {
            AppError::with_source(
                ErrorKind::TransientLookup,
                "Identity reference is not a user id",
                e,
            )
        })?;

        if !self.load_user_record {
            return Ok(CurrentUser::from_reference(id));
        }

        let user = self
            .users
            .find_by_id(id)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::TransientLookup, "User lookup failed", e))?
            .ok_or_else(|| AppError::transient_lookup(format!("No user with id {id}")))?;

        debug!(user_id = %user.id, "Identity resolved");
        Ok(CurrentUser::from_record(user))
    }
}
