//! # portcullis-core
//!
//! Core crate for Portcullis. Contains the configuration schemas, the
//! unified error system, and the `AppResult` alias shared by every other
//! crate in the workspace.
//!
//! This crate has **no** internal dependencies on other Portcullis crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
