//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use portcullis_auth::notify::SignupNotifier;
use portcullis_auth::{AuthService, CredentialHasher, IdentityResolver};
use portcullis_core::config::AppConfig;
use portcullis_core::result::AppResult;
use portcullis_database::UserStore;
use portcullis_session::{SessionBackend, SessionStore};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Opens per-request sessions
    pub sessions: SessionStore,
    /// Turns session identity into a `CurrentUser`
    pub identity: Arc<IdentityResolver>,
    /// Signup, login, logout, confirmation
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Wire the state from its collaborators.
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        session_backend: Arc<dyn SessionBackend>,
        notifier: Arc<dyn SignupNotifier>,
    ) -> AppResult<Self> {
        let hasher = CredentialHasher::from_config(&config.auth)?;
        let sessions = SessionStore::new(session_backend, config.session.ttl());
        let identity = Arc::new(IdentityResolver::new(Arc::clone(&users), &config.auth));
        let auth = Arc::new(AuthService::new(users, hasher, notifier, &config.auth));

        Ok(Self {
            config: Arc::new(config),
            sessions,
            identity,
            auth,
        })
    }
}
