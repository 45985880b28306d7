//! # portcullis-database
//!
//! User-record persistence for Portcullis: the [`UserStore`] seam consumed
//! by the auth core, its PostgreSQL and in-memory implementations, the
//! [`transact`] atomic execution wrapper, pool management, and migrations.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;
pub mod transaction;

pub use connection::DatabasePool;
pub use memory::MemoryUserStore;
pub use repositories::user::PgUserStore;
pub use store::{UserStore, UserTransaction};
pub use transaction::transact;
