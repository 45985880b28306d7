//! Convenience result type alias for Portcullis.

use crate::error::AppError;

/// A specialized `Result` type for Portcullis operations.
///
/// Saves every crate from spelling out `Result<T, AppError>`.
pub type AppResult<T> = Result<T, AppError>;
