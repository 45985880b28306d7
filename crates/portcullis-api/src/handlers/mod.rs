//! Route handlers organized by domain.

pub mod auth;
pub mod flash;
pub mod health;
