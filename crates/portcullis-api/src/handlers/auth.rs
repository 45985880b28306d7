//! Auth handlers: signup, login, logout, confirm, me.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;

use portcullis_auth::flash::add_flash;
use portcullis_entity::session::Flash;

use crate::dto::request::{LoginRequest, SignupRequest};
use crate::dto::response::{ApiResponse, IdentityResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::{Identity, SessionHandle, ValidatedJson};
use crate::middleware::auth::found;
use crate::state::AppState;

/// POST /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    SessionHandle(session): SessionHandle,
    ValidatedJson(req): ValidatedJson<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    let user = state
        .auth
        .signup(&req.email, &req.password, req.attribution.as_deref())
        .await?;

    add_flash(
        &session,
        Flash::info("Check your inbox to confirm your email address"),
        None,
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(UserResponse::from(&user))),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    SessionHandle(session): SessionHandle,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state
        .auth
        .login(&session, &req.email, &req.password)
        .await?;

    add_flash(&session, Flash::success("Logged in"), None).await;

    Ok(Json(ApiResponse::ok(UserResponse::from(&user))))
}

/// GET|POST /auth/logout
///
/// Always redirects, whether or not anyone was logged in.
pub async fn logout(State(state): State<AppState>, SessionHandle(session): SessionHandle) -> Response {
    if state.auth.logout(&session).await {
        add_flash(&session, Flash::success("Logged out"), None).await;
    }
    found(&state.config.auth.anonymous_redirect)
}

/// GET /auth/confirm/{seed}
pub async fn confirm(
    State(state): State<AppState>,
    Path(seed): Path<String>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.auth.confirm_email(&seed).await?;
    Ok(Json(ApiResponse::ok(UserResponse::from(&user))))
}

/// GET /auth/me
pub async fn me(identity: Identity) -> Json<ApiResponse<IdentityResponse>> {
    Json(ApiResponse::ok(IdentityResponse {
        is_logged_in: identity.is_logged_in,
        user_id: identity.user_id(),
        user: identity.db_user.as_ref().map(UserResponse::from),
    }))
}
