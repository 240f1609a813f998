//! HTTP error mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ringline_session_core::SessionError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound(_) => ApiError::NotFound("Call not found".to_string()),
            SessionError::Unauthorized { .. } => {
                ApiError::Unauthorized("Not a participant of this call".to_string())
            }
            // Clients see a stale/duplicate lifecycle event as an
            // already-resolved call, not as a hard failure.
            SessionError::InvalidTransition { .. } | SessionError::AlreadyTerminal(_) => {
                ApiError::Conflict("Call already resolved".to_string())
            }
            SessionError::InvalidParticipants => {
                ApiError::BadRequest("A call needs two distinct, existing participants".to_string())
            }
            SessionError::StoreUnavailable(_) => {
                ApiError::ServiceUnavailable("Temporarily unavailable, please retry".to_string())
            }
        }
    }
}

impl From<ringline_users_core::Error> for ApiError {
    fn from(e: ringline_users_core::Error) -> Self {
        use ringline_users_core::Error;
        match e {
            Error::UserAlreadyExists(_) => {
                ApiError::Conflict("Username or email already exists".to_string())
            }
            Error::UserNotFound(_) => ApiError::NotFound("User not found".to_string()),
            Error::InvalidCredentials => ApiError::Unauthorized("Invalid credentials".to_string()),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Jwt(_) => ApiError::Unauthorized("Not authenticated".to_string()),
            Error::Database(e) => ApiError::ServiceUnavailable(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
