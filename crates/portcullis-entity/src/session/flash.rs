//! One-shot flash messages carried across a redirect.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Bucket used when the caller does not name one.
pub const DEFAULT_FLASH_BUCKET: &str = "_flash";

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    /// Neutral information.
    Info,
    /// A completed action.
    Success,
    /// Something the user should double-check.
    Warning,
    /// A failed action.
    Error,
}

impl FlashKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for FlashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FlashKind {
    type Err = portcullis_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "success" => Ok(Self::Success),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            _ => Err(portcullis_core::AppError::validation(format!(
                "Invalid flash kind: '{s}'. Expected one of: info, success, warning, error"
            ))),
        }
    }
}

/// A typed, user-facing message shown once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    /// Severity.
    pub kind: FlashKind,
    /// Text shown to the user.
    pub message: String,
}

impl Flash {
    /// Creates a flash of the given kind.
    pub fn new(kind: FlashKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for an informational flash.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(FlashKind::Info, message)
    }

    /// Shorthand for a success flash.
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(FlashKind::Success, message)
    }

    /// Shorthand for an error flash.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(FlashKind::Error, message)
    }
}
