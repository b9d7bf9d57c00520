use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use citizen_core::error::{BackendError, DomainError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend error: {0}")]
    BackendUnavailable(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::UserNotFound
            | BackendError::InvalidCredentials
            | BackendError::InvalidSession
            | BackendError::Unauthorized(_) => ApiError::Unauthorized(err.to_string()),
            BackendError::Upstream { status, message } if status < 500 => {
                ApiError::BadRequest(message)
            }
            other => ApiError::BackendUnavailable(other.to_string()),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::ValidationError(msg) => ApiError::BadRequest(msg),
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::Forbidden(msg) => ApiError::Forbidden(msg),
            DomainError::Backend(e) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, "BadRequest", msg)
            }
            ApiError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized: {}", msg);
                (StatusCode::UNAUTHORIZED, "Unauthorized", msg)
            }
            ApiError::Forbidden(msg) => {
                tracing::warn!("Forbidden: {}", msg);
                (StatusCode::FORBIDDEN, "Forbidden", msg)
            }
            ApiError::NotFound(msg) => {
                tracing::warn!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, "NotFound", msg)
            }
            ApiError::BackendUnavailable(msg) => {
                tracing::error!("Backend error: {}", msg);
                (StatusCode::BAD_GATEWAY, "BackendUnavailable", msg)
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "InternalError", msg)
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_backend_error_statuses() {
        assert_eq!(status_of(BackendError::UserNotFound), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(BackendError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(BackendError::Transport("refused".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(BackendError::Upstream {
                status: 409,
                message: "duplicate".into()
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(BackendError::Upstream {
                status: 500,
                message: "boom".into()
            }),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_domain_error_statuses() {
        assert_eq!(
            status_of(DomainError::ValidationError("email".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(DomainError::NotFound("guide".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(DomainError::Forbidden("admin".into())), StatusCode::FORBIDDEN);
    }
}
