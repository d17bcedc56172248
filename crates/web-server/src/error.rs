use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use database::{DbError, ValidationError};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    /// The request could not be turned into a record (malformed JSON, a
    /// non-ISO date, a non-numeric path segment, ...).
    #[error("Bad request: {0}")]
    BadRequest(String),
    /// A field-level rule checked before the store is touched.
    #[error(transparent)]
    Invalid(ValidationError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Converts our custom `AppError` into an HTTP response.
///
/// Only input-related messages reach the body; store failures are logged and
/// answered with a generic message.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Database(DbError::Validation(validation)) | AppError::Invalid(validation) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": validation.message, "field": validation.field }),
            ),
            AppError::Database(db_err) if db_err.is_unavailable() => {
                tracing::error!(error = ?db_err, "Database unavailable.");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({ "error": "The data store is currently unavailable" }),
                )
            }
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "An internal database error occurred" }),
                )
            }
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
        };

        (status, Json(body)).into_response()
    }
}
