//! Domain errors

use thiserror::Error;

/// Failures reported by a backend client, real or mock.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("User not found")]
    UserNotFound,

    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Session is invalid or expired")]
    InvalidSession,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Backend unreachable: {0}")]
    Transport(String),

    #[error("Backend returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Unexpected backend response: {0}")]
    Decode(String),
}

impl BackendError {
    /// The backend looked at the credentials and said no.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self,
            BackendError::UserNotFound
                | BackendError::InvalidCredentials
                | BackendError::InvalidSession
                | BackendError::Unauthorized(_)
        )
    }

    /// The backend could not give an answer at all.
    pub fn is_unavailable(&self) -> bool {
        match self {
            BackendError::Transport(_) | BackendError::Decode(_) => true,
            BackendError::Upstream { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(errors.to_string())
    }
}
