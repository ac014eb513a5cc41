use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use mongodb::bson::oid::ObjectId;
use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;
use validator::ValidationErrors;

/// Server error code for a unique index violation
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Invalid product id: {0}")]
    InvalidId(String),

    #[error("Product not found: {0}")]
    NotFound(ObjectId),

    #[error("Product with name '{0}' already exists")]
    DuplicateName(String),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::InvalidId(_) => AppError::BadRequest("Invalid Product ID format".into()),
            ProductError::NotFound(_) => AppError::NotFound("Product not found".into()),
            ProductError::DuplicateName(name) => AppError::BadRequest(format!(
                "A product with the name \"{name}\" already exists."
            )),
            ProductError::Validation(errors) => AppError::Validation(errors),
            ProductError::Database(msg) => AppError::Internal(msg),
            ProductError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for ProductError {
    fn from(err: mongodb::error::Error) -> Self {
        ProductError::Database(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for ProductError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        ProductError::Internal(err.to_string())
    }
}

/// Whether the server rejected a write because of a unique index.
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}
