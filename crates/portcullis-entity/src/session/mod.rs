//! Session domain entities.

pub mod data;
pub mod flash;

pub use data::SessionData;
pub use flash::{DEFAULT_FLASH_BUCKET, Flash, FlashKind};
