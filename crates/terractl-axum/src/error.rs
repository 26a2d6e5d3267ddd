//! Axum-specific error types and mappings.
//!
//! Failures leave the adapter as `{success: false, error, message, detail?}`
//! with the status code derived from the [`CoreError`] class.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use terractl_core::CoreError;
use thiserror::Error;

use crate::auth::AuthError;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Bad request (invalid input or wrong process state).
    #[error("{message}")]
    BadRequest { error: &'static str, message: String },

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Resource already exists.
    #[error("{0}")]
    Conflict(String),

    /// An external command or filesystem mutation failed.
    #[error("{message}: {detail}")]
    Internal {
        error: &'static str,
        message: String,
        detail: String,
    },

    /// Missing, expired or rejected credentials.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl HttpError {
    pub fn bad_request(error: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            error,
            message: message.into(),
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, message, detail) = match self {
            Self::BadRequest { error, message } => (error, message, None),
            Self::NotFound(message) => ("Not found", message, None),
            Self::Conflict(message) => ("Already exists", message, None),
            Self::Internal {
                error,
                message,
                detail,
            } => {
                tracing::error!(%message, %detail, "Request failed");
                (error, message, Some(detail))
            }
            Self::Auth(e) => return e.into_response(),
        };

        let body = ErrorBody {
            success: false,
            error,
            message,
            detail,
        };
        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for HttpError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => Self::bad_request("Validation error", msg),
            CoreError::InvalidState(msg) => Self::bad_request("Invalid state", msg),
            CoreError::NotFound(msg) => Self::NotFound(msg),
            CoreError::AlreadyExists(msg) => Self::Conflict(msg),
            CoreError::ExternalFailure { message, detail } => Self::Internal {
                error: "Command failed",
                message,
                detail,
            },
            CoreError::PostconditionMismatch { message, detail } => Self::Internal {
                error: "Postcondition failed",
                message,
                detail,
            },
            CoreError::Storage { message, detail } => Self::Internal {
                error: "Storage error",
                message,
                detail,
            },
        }
    }
}
