//! # portcullis-api
//!
//! HTTP layer for Portcullis built on Axum.
//!
//! Provides the session and identity middleware, the access gate for
//! protected routes, account and flash endpoints, DTOs, error mapping,
//! and server wiring.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
