//! API error handling for the STASH HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::StashError;

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Bad request (400).
    BadRequest,
    /// Unauthorized (401).
    Unauthorized,
    /// Forbidden (403).
    Forbidden,
    /// Not found (404).
    NotFound,
    /// Conflict (409).
    Conflict,
    /// Validation error (422).
    ValidationError,
    /// Internal server error (500).
    InternalError,
}

impl ErrorCode {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub detail: String,
}

/// An error surfaced to an API caller.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    detail: String,
}

impl ApiError {
    /// Create an error with the given code and message.
    pub fn new(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }

    /// 400 Bad Request.
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, detail)
    }

    /// 401 Unauthorized.
    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, detail)
    }

    /// 403 Forbidden.
    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, detail)
    }

    /// 404 Not Found.
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, detail)
    }

    /// 500 Internal Server Error.
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, detail)
    }
}

impl From<StashError> for ApiError {
    fn from(e: StashError) -> Self {
        match e {
            StashError::NotFound(_) => Self::new(ErrorCode::NotFound, e.to_string()),
            StashError::Forbidden(_) => Self::new(ErrorCode::Forbidden, e.to_string()),
            StashError::Unauthenticated(_) => Self::new(ErrorCode::Unauthorized, e.to_string()),
            StashError::Conflict(_) => Self::new(ErrorCode::Conflict, e.to_string()),
            StashError::InvalidQuery(_) => Self::new(ErrorCode::BadRequest, e.to_string()),
            StashError::UnknownUser(_) => Self::new(ErrorCode::NotFound, e.to_string()),
            StashError::Validation(_) => Self::new(ErrorCode::ValidationError, e.to_string()),
            // Internal conditions: log carries the detail, the caller gets
            // a generic message
            StashError::Corrupt(_) | StashError::Database(_) | StashError::Io(_)
            | StashError::Config(_) => {
                tracing::error!(error = %e, "internal error surfaced to API");
                Self::internal("internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        let body = Json(ErrorBody {
            code: self.code,
            detail: self.detail,
        });
        (status, body).into_response()
    }
}
