use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::{ErrorResponse, messages};

/// Router fallback for unmatched paths.
pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(messages::ROUTE_NOT_FOUND)),
    )
        .into_response()
}
