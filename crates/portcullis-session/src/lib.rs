//! # portcullis-session
//!
//! Server-side sessions for Portcullis. A [`Session`] is the per-request
//! handle over one client's [`SessionData`](portcullis_entity::session::SessionData);
//! the bag itself lives in a [`SessionBackend`]:
//!
//! - **memory**: In-process store using [moka](https://crates.io/crates/moka)
//! - **postgres**: `sessions` table via [sqlx](https://crates.io/crates/sqlx)
//!
//! The backend is selected at runtime based on configuration.

pub mod backend;
#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod session;
pub mod store;

pub use backend::SessionBackend;
pub use session::Session;
pub use store::SessionStore;
