//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// SQLSTATE for unique_violation.
const PG_UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE for foreign_key_violation.
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
    #[error("unknown storage backend '{0}' (expected 'postgres' or 'memory')")]
    UnknownStorage(String),
    #[error("validation: {0}")]
    Validation(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("database: {0}")]
    Db(sqlx::Error),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
}

impl From<sqlx::Error> for AppError {
    /// Constraint violations become client errors; everything else stays a database error.
    fn from(e: sqlx::Error) -> Self {
        let code = e
            .as_database_error()
            .and_then(|d| d.code())
            .map(|c| c.into_owned());
        match code.as_deref() {
            Some(PG_UNIQUE_VIOLATION) => AppError::Conflict("a record with this id already exists".into()),
            Some(PG_FOREIGN_KEY_VIOLATION) => AppError::Validation("referenced record does not exist".into()),
            _ => AppError::Db(e),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let (status, code) = AppError::NotFound("course 7".into()).status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "not_found");
    }

    #[test]
    fn row_not_found_is_404_not_500() {
        let (status, _) = AppError::from(sqlx::Error::RowNotFound).status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn conflict_and_validation_codes() {
        assert_eq!(AppError::Conflict("x".into()).status_and_code().0, StatusCode::CONFLICT);
        assert_eq!(AppError::Validation("x".into()).status_and_code().0, StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::PayloadTooLarge("x".into()).status_and_code(),
            (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large")
        );
    }
}
