//! JSON body extractor that rejects with the shared error body.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// Like [`axum::Json`], but rejects with the shared error body.
///
/// A missing content type or syntactically broken JSON becomes a `400`
/// [`AppError::JsonRejection`]. A well-formed object whose fields have the
/// wrong type becomes [`AppError::Validation`] with kind `type` per field.
///
/// ```ignore
/// async fn create(JsonBody(input): JsonBody<CreateProduct>) -> Result<..., AppError> { ... }
/// ```
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state).await?;
        from_json_value(value).map(JsonBody)
    }
}

/// Deserialize a parsed body into `T`.
///
/// When that fails for an object, each top-level field is tried on its own
/// so the offending ones can be named. This relies on `T` accepting objects
/// with missing fields, which holds for request types made of `Option`s.
pub fn from_json_value<T: DeserializeOwned>(value: Value) -> Result<T, AppError> {
    let err = match serde_json::from_value::<T>(value.clone()) {
        Ok(data) => return Ok(data),
        Err(err) => err,
    };

    let Value::Object(fields) = value else {
        return Err(AppError::BadRequest(format!(
            "Failed to deserialize the JSON body into the target type: {err}"
        )));
    };

    let mut errors = ValidationErrors::new();
    for (field, field_value) in fields {
        let single = Value::Object(Map::from_iter([(field.clone(), field_value.clone())]));
        if let Err(field_err) = serde_json::from_value::<T>(single) {
            let mut error = ValidationError::new("type")
                .with_message(format!("Invalid value for `{field}`: {field_err}").into());
            error.add_param("value".into(), &field_value);
            errors
                .0
                .insert(Cow::Owned(field), ValidationErrorsKind::Field(vec![error]));
        }
    }

    if errors.is_empty() {
        Err(AppError::BadRequest(format!(
            "Failed to deserialize the JSON body into the target type: {err}"
        )))
    } else {
        Err(AppError::Validation(errors))
    }
}
