//! Identity resolution and access enforcement.
//!
//! `resolve_identity` runs on every request and never blocks it.
//! `enforce_auth` is layered onto protected routes only and must sit
//! inside `resolve_identity`.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::http::header::LOCATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use portcullis_auth::CurrentUser;
use portcullis_core::error::AppError;
use portcullis_session::Session;

use crate::error::ApiError;
use crate::state::AppState;

/// Resolve the caller once and cache it in request extensions.
///
/// Anonymous on every failure, including a missing session.
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = request.extensions().get::<Session>().cloned();

    let current = match session {
        Some(session) => state.identity.resolve(&session).await,
        None => {
            warn!("No session on request, treating caller as anonymous");
            CurrentUser::anonymous()
        }
    };

    request.extensions_mut().insert(Arc::new(current));
    next.run(request).await
}

/// Redirect anonymous callers away from protected routes.
///
/// A request that never went through [`resolve_identity`] is a wiring
/// error and fails with a configuration error.
pub async fn enforce_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(current) = request.extensions().get::<Arc<CurrentUser>>() else {
        return Err(AppError::configuration(
            "Access gate reached before identity resolution; install resolve_identity first",
        )
        .into());
    };

    if !current.is_logged_in {
        debug!(path = %request.uri().path(), "Anonymous caller redirected");
        return Ok(found(&state.config.auth.anonymous_redirect));
    }

    Ok(next.run(request).await)
}

/// `302 Found` to `location` with an empty body.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::Router;
    use axum::body::Body;
    use axum::middleware::from_fn_with_state;
    use axum::routing::get;
    use tower::ServiceExt;

    use portcullis_auth::notify::SignupNotifier;
    use portcullis_core::config::AppConfig;
    use portcullis_database::MemoryUserStore;
    use portcullis_entity::user::User;
    use portcullis_session::memory::MemorySessionBackend;

    #[derive(Debug)]
    struct Silent;

    impl SignupNotifier for Silent {
        fn notify_new_user(&self, _user: &User) {}
    }

    fn state() -> AppState {
        AppState::new(
            AppConfig::default(),
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemorySessionBackend::with_capacity(16)),
            Arc::new(Silent),
        )
        .unwrap()
    }

    async fn status_of(router: Router) -> (StatusCode, Option<String>) {
        let request = axum::http::Request::builder()
            .uri("/private")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let location = response
            .headers()
            .get(LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        (response.status(), location)
    }

    #[tokio::test]
    async fn test_gate_without_identity_is_configuration_error() {
        let state = state();
        let router = Router::new()
            .route("/private", get(|| async { "secret" }))
            .route_layer(from_fn_with_state(state.clone(), enforce_auth))
            .with_state(state);

        let (status, location) = status_of(router).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(location.is_none());
    }

    #[tokio::test]
    async fn test_gate_redirects_anonymous_without_session_layer() {
        let state = state();
        let router = Router::new()
            .route("/private", get(|| async { "secret" }))
            .route_layer(from_fn_with_state(state.clone(), enforce_auth))
            .layer(from_fn_with_state(state.clone(), resolve_identity))
            .with_state(state);

        let (status, location) = status_of(router).await;
        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(location.as_deref(), Some("/"));
    }

    #[test]
    fn test_found_has_location() {
        let response = found("/login");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/login");
    }
}
