//! # portcullis-entity
//!
//! Domain entity models for Portcullis. `user` holds the durable account
//! record and its lightweight per-request projection; `session` holds the
//! per-client key/value bag and its flash entries. Database entities
//! additionally derive `sqlx::FromRow`.

pub mod session;
pub mod user;
