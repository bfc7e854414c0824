use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use core_types::{FieldError, ValidationErrors};
use database::DbError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Empty or malformed request body.
    #[error("{0}")]
    Decode(String),
    #[error("invalid id format")]
    InvalidId,
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("student not found")]
    NotFound(i64),
    #[error("Database error: {0}")]
    Database(DbError),
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(id) => AppError::NotFound(id),
            other => AppError::Database(other),
        }
    }
}

/// The JSON shape of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

impl ErrorBody {
    fn new(error: impl Into<String>) -> Self {
        Self { status: "Error", error: error.into(), fields: None }
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Decode(message) => (StatusCode::BAD_REQUEST, ErrorBody::new(message)),
            AppError::InvalidId => (StatusCode::BAD_REQUEST, ErrorBody::new("invalid id format")),
            AppError::Validation(errors) => {
                let mut body = ErrorBody::new(errors.to_string());
                body.fields = Some(errors.0);
                (StatusCode::BAD_REQUEST, body)
            }
            AppError::NotFound(id) => {
                tracing::debug!(student_id = id, "student not found");
                (StatusCode::NOT_FOUND, ErrorBody::new("student not found"))
            }
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("An internal database error occurred"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
