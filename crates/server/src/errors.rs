use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorResponse;
use service::token::TokenError;
use service::user::{FailureKind, UserError};
use thiserror::Error;
use tracing::{error, warn};

/// Everything a user endpoint can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

impl ApiError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::User(e) => e.kind(),
            ApiError::Token(_) | ApiError::MalformedRequest(_) => FailureKind::Unknown,
        }
    }
}

/// Status for the failure kinds this layer answers itself. `None` means the
/// failure is unclassified and gets the generic 500.
pub fn status_for(kind: FailureKind) -> Option<StatusCode> {
    match kind {
        FailureKind::NotFound => Some(StatusCode::NOT_FOUND),
        FailureKind::InvalidCredentials => Some(StatusCode::UNAUTHORIZED),
        FailureKind::Conflict | FailureKind::Unknown => None,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match status_for(self.kind()) {
            Some(status) => {
                warn!(status = %status, error = %self, "request rejected");
                (status, Json(ErrorResponse::new(self.to_string()))).into_response()
            }
            None => {
                let code = match &self {
                    ApiError::User(e) => e.code(),
                    _ => 0,
                };
                error!(error = %self, code, "unhandled request failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
