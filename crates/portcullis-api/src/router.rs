//! Route definitions for the Portcullis HTTP API.
//!
//! Every route runs behind the session and identity middleware. Protected
//! routes additionally sit behind the access gate.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
///
/// Receives the fully-constructed `AppState` and threads it through
/// every route via `.with_state(state)`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::resolve_identity,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::session::load_session,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Account endpoints and utilities open to everyone
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(handlers::auth::signup))
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/auth/logout",
            get(handlers::auth::logout).post(handlers::auth::logout),
        )
        .route("/auth/confirm/{seed}", get(handlers::auth::confirm))
        .route("/flashes", get(handlers::flash::list))
        .route("/health", get(handlers::health::health))
}

/// Endpoints requiring a logged-in caller
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::auth::enforce_auth,
        ))
}
