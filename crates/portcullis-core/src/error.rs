//! Unified application error types for Portcullis.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the `?` operator. The [`ErrorKind`] carried by each
//! error decides how callers treat it: some kinds are surfaced to the
//! client, some are logged and swallowed by the read path.

use std::fmt;
use thiserror::Error;

/// Message returned for every failed login, whatever the root cause.
pub const BAD_CREDENTIALS: &str = "Bad credentials";

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Malformed client input. Never retried.
    Validation,
    /// No confirmed account matches the supplied credentials.
    Credentials,
    /// Resolving a session identity into a user failed during normal
    /// request processing.
    TransientLookup,
    /// The session could not be persisted.
    Persistence,
    /// An unexpected storage fault (anything besides "no rows").
    Storage,
    /// A uniqueness constraint rejected an insert.
    Conflict,
    /// The requested resource was not found.
    NotFound,
    /// A configuration or wiring error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal server error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::Credentials => write!(f, "CREDENTIALS"),
            Self::TransientLookup => write!(f, "TRANSIENT_LOOKUP"),
            Self::Persistence => write!(f, "PERSISTENCE"),
            Self::Storage => write!(f, "STORAGE"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout Portcullis.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create the generic credential error.
    ///
    /// The message is fixed so that callers cannot tell an unknown email,
    /// a wrong password, and a pending confirmation apart.
    pub fn bad_credentials() -> Self {
        Self::new(ErrorKind::Credentials, BAD_CREDENTIALS)
    }

    /// Create a transient lookup error.
    pub fn transient_lookup(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransientLookup, message)
    }

    /// Create a session persistence error.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Persistence, message)
    }

    /// Create an unexpected storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Returns `true` for kinds that indicate a server-side fault rather
    /// than a problem with the caller's input.
    pub fn is_server_fault(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::TransientLookup
                | ErrorKind::Persistence
                | ErrorKind::Storage
                | ErrorKind::Configuration
                | ErrorKind::Serialization
                | ErrorKind::Internal
        )
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
