//! API error type and the JSON error envelope
//!
//! Every error response has the shape
//! `{"status": "error", "error": "<message>", "fields": [...]}` where `fields`
//! only appears for validation failures. Storage failures are logged here with
//! full detail and reach the client as a fixed message.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use super::Status;

/// One failing request field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error envelope body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: Status,
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

/// Request handling errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// `id` path segment is not a positive integer
    #[error("invalid id '{0}'")]
    InvalidId(String),

    /// Body could not be decoded
    #[error("invalid request body: {0}")]
    BadRequest(String),

    /// Decoded body failed validation
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// No row with the requested id
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Store failure; the message is safe to show to clients
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    /// Map a storage error, logging anything that is not a plain "not found"
    pub fn storage(context: &'static str, err: musiclib_common::Error) -> Self {
        match err {
            musiclib_common::Error::NotFound { entity, .. } => ApiError::NotFound(entity),
            err => {
                error!(error = %err, "{}", context);
                ApiError::Internal(context)
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidId(_) | ApiError::BadRequest(_) | ApiError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        let fields = match self {
            ApiError::Validation(fields) => {
                debug!(count = fields.len(), "Request failed validation");
                fields
            }
            _ => Vec::new(),
        };

        let body = Json(ErrorResponse {
            status: Status::Error,
            error: message,
            fields,
        });

        (status, body).into_response()
    }
}

/// Parse an `id` path segment as a positive integer
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::InvalidId(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(ApiError::InvalidId(_))));
        assert!(matches!(parse_id("0"), Err(ApiError::InvalidId(_))));
        assert!(matches!(parse_id("-3"), Err(ApiError::InvalidId(_))));
        assert!(matches!(parse_id("1.5"), Err(ApiError::InvalidId(_))));
        assert!(matches!(parse_id(""), Err(ApiError::InvalidId(_))));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::InvalidId("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Validation(vec![]).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("artist").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal("failed to list artists").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_is_not_internal() {
        let err = ApiError::storage(
            "failed to load song",
            musiclib_common::Error::NotFound { entity: "song", id: 9 },
        );
        assert!(matches!(err, ApiError::NotFound("song")));
    }

    #[test]
    fn test_storage_error_hides_detail() {
        let err = ApiError::storage(
            "failed to create artist",
            musiclib_common::Error::Constraint {
                table: "artists",
                constraint: "artists_name_key".to_string(),
            },
        );
        assert_eq!(err.to_string(), "failed to create artist");
    }
}
