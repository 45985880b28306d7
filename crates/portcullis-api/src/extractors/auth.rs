//! Extractors for the per-request session and resolved identity.
//!
//! Both values are placed in request extensions by middleware. Their
//! absence means the middleware stack is misconfigured.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use portcullis_auth::CurrentUser;
use portcullis_core::error::AppError;
use portcullis_session::Session;

use crate::error::ApiError;

/// The resolved identity of the current request.
#[derive(Debug, Clone)]
pub struct Identity(pub Arc<CurrentUser>);

impl std::ops::Deref for Identity {
    type Target = CurrentUser;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Arc<CurrentUser>>()
            .cloned()
            .map(Identity)
            .ok_or_else(|| {
                AppError::configuration("Identity requested but the auth middleware did not run")
                    .into()
            })
    }
}

/// The session of the current request.
#[derive(Debug, Clone)]
pub struct SessionHandle(pub Session);

impl<S: Send + Sync> FromRequestParts<S> for SessionHandle {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(SessionHandle)
            .ok_or_else(|| {
                AppError::configuration("Session requested but the session middleware did not run")
                    .into()
            })
    }
}
