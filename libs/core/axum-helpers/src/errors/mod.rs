pub mod handlers;
pub mod responses;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Fixed client-facing messages
pub mod messages {
    pub const SERVER_ERROR: &str = "Server Error";
    pub const VALIDATION_ERROR: &str = "Validation Error";
    pub const ROUTE_NOT_FOUND: &str = "Route not found";
}

/// Body of every error response.
///
/// ```json
/// { "message": "Validation Error", "errors": { "price": { "kind": "range", ... } } }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub message: String,
    /// Per-field violations, present only for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub errors: Option<Value>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
        }
    }
}

/// Application error type that can be converted to HTTP responses.
///
/// Client errors carry the message that is sent back. `Internal` carries
/// detail for the logs only; clients always see [`messages::SERVER_ERROR`].
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Invalid request body: {0}")]
    JsonRejection(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(message) => {
                tracing::info!(%message, "Bad request");
                (StatusCode::BAD_REQUEST, ErrorResponse::new(message))
            }
            AppError::JsonRejection(rejection) => {
                tracing::info!(error = %rejection, "Rejected request body");
                (StatusCode::BAD_REQUEST, ErrorResponse::new(rejection.body_text()))
            }
            AppError::Validation(errors) => {
                tracing::info!(fields = ?errors.field_errors().keys().collect::<Vec<_>>(), "Validation error");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        message: messages::VALIDATION_ERROR.to_string(),
                        errors: Some(validation_errors_to_json(&errors)),
                    },
                )
            }
            AppError::NotFound(message) => {
                tracing::info!(%message, "Not found");
                (StatusCode::NOT_FOUND, ErrorResponse::new(message))
            }
            AppError::Internal(detail) => {
                tracing::error!(%detail, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(messages::SERVER_ERROR),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Flatten validator output into `{field: {kind, message, path, value}}`.
///
/// Only the first violation per field is reported.
pub fn validation_errors_to_json(errors: &ValidationErrors) -> Value {
    let mut fields = Map::new();

    for (field, field_errors) in errors.field_errors() {
        let Some(error) = field_errors.first() else {
            continue;
        };
        let message = error
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("Path `{field}` is invalid."));

        fields.insert(
            field.to_string(),
            json!({
                "kind": error.code,
                "message": message,
                "path": field,
                "value": error.params.get("value").cloned().unwrap_or(Value::Null),
            }),
        );
    }

    Value::Object(fields)
}
