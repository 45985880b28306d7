//! Custom Axum extractors.

pub mod auth;
pub mod json;

pub use auth::{Identity, SessionHandle};
pub use json::ValidatedJson;
