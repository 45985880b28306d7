//! One-shot flash messages stored in the session.

use tracing::warn;

use portcullis_entity::session::{DEFAULT_FLASH_BUCKET, Flash};
use portcullis_session::Session;

/// Append a flash and persist the session.
///
/// A save failure is logged; the flash then only lives for this request.
pub async fn add_flash(session: &Session, flash: Flash, bucket: Option<&str>) {
    session
        .add_flash(flash, bucket.unwrap_or(DEFAULT_FLASH_BUCKET))
        .await;
    if let Err(e) = session.save().await {
        warn!(error = %e, "Failed to save session after adding flash");
    }
}

/// Drain every flash in a bucket.
///
/// The session is re-saved only if something was drained. If that save
/// fails the same flashes may be shown again on a later request.
pub async fn get_flashes(session: &Session, bucket: Option<&str>) -> Vec<Flash> {
    let flashes = session
        .flashes(bucket.unwrap_or(DEFAULT_FLASH_BUCKET))
        .await;

    if !flashes.is_empty() {
        if let Err(e) = session.save().await {
            warn!(error = %e, "Failed to save session after draining flashes");
        }
    }
    flashes
}
