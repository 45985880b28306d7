//! # portcullis-auth
//!
//! Request-scoped authentication for Portcullis.
//!
//! ## Modules
//!
//! - `password`: Deterministic Argon2id credential hashing
//! - `identity`: Per-request resolution of the session identity
//! - `service`: Signup, login, logout, and email confirmation flows
//! - `flash`: One-shot session messages
//! - `notify`: Post-commit signup notifications

pub mod flash;
pub mod identity;
pub mod notify;
pub mod password;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use identity::{CurrentUser, IdentityResolver};
pub use notify::{NotificationDispatcher, SignupEvent, SignupNotifier};
pub use password::CredentialHasher;
pub use service::AuthService;
