//! Flash handlers.

use axum::Json;
use axum::extract::Query;

use portcullis_auth::flash::get_flashes;
use portcullis_entity::session::Flash;

use crate::dto::request::FlashQuery;
use crate::dto::response::ApiResponse;
use crate::extractors::SessionHandle;

/// GET /flashes?bucket=
pub async fn list(
    SessionHandle(session): SessionHandle,
    Query(query): Query<FlashQuery>,
) -> Json<ApiResponse<Vec<Flash>>> {
    let flashes = get_flashes(&session, query.bucket.as_deref()).await;
    Json(ApiResponse::ok(flashes))
}
