//! HTTP-facing error mapping (§7).
//!
//! `teledrop_core::Error` is the source of truth for failure kinds; this
//! newtype is the thin translation to a status code and JSON body, following
//! the teacher's `ApiError`/`IntoResponse` shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub struct ApiError(pub teledrop_core::Error);

impl From<teledrop_core::Error> for ApiError {
    fn from(err: teledrop_core::Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use teledrop_core::Error;

        let (status, kind) = match &self.0 {
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Error::AuthRequired => (StatusCode::UNAUTHORIZED, "auth_required"),
            Error::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            Error::PasswordRequired => (StatusCode::UNAUTHORIZED, "password_required"),
            Error::PasswordInvalid => (StatusCode::UNAUTHORIZED, "password_invalid"),
            Error::SlugTaken(_) => (StatusCode::CONFLICT, "slug_taken"),
            Error::SlugExhausted(_) => (StatusCode::INTERNAL_SERVER_ERROR, "slug_exhausted"),
            Error::SlugInvalid(_) => (StatusCode::BAD_REQUEST, "slug_invalid"),
            Error::SizeLimitExceeded { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "size_limit_exceeded"),
            Error::ValidationError(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            Error::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            Error::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            Error::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, kind, "request failed");
        }

        (status, Json(json!({ "error": kind, "message": self.0.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
