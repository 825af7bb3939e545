use thiserror::Error;

use crate::storage::StorageError;

/// Coarse classification the HTTP boundary translates into status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotFound,
    InvalidCredentials,
    Conflict,
    Unknown,
}

/// Business errors for signup and login
#[derive(Debug, Error)]
pub enum UserError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("username is already taken")]
    UsernameTaken,
    #[error("email is already registered")]
    EmailTaken,
    #[error("user not found")]
    NotFound,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl UserError {
    pub fn kind(&self) -> FailureKind {
        match self {
            UserError::NotFound => FailureKind::NotFound,
            UserError::InvalidCredentials => FailureKind::InvalidCredentials,
            UserError::UsernameTaken | UserError::EmailTaken => FailureKind::Conflict,
            UserError::Validation(_) | UserError::HashError(_) | UserError::Repository(_) => FailureKind::Unknown,
        }
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            UserError::Validation(_) => 1001,
            UserError::UsernameTaken => 1002,
            UserError::EmailTaken => 1003,
            UserError::NotFound => 1004,
            UserError::InvalidCredentials => 1005,
            UserError::HashError(_) => 1101,
            UserError::Repository(_) => 1200,
        }
    }
}

impl From<StorageError> for UserError {
    fn from(e: StorageError) -> Self {
        UserError::Repository(e.to_string())
    }
}
