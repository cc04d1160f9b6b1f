//! Client error taxonomy.

use thiserror::Error;

use goaltrack_auth::AuthError;
use goaltrack_core::{DomainError, GoalId};

use crate::remote::RemoteError;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Bad user input; nothing was sent anywhere.
    #[error("validation failed: {0}")]
    Validation(String),

    /// No usable session; the user has to sign in again.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The remote store call failed; local state is unchanged.
    #[error("sync failed: {0}")]
    Sync(#[from] RemoteError),

    /// The referenced goal is not in the in-memory collection.
    #[error("goal not found: {0}")]
    NotFound(GoalId),

    /// An import document could not be read.
    #[error("unreadable import document: {0}")]
    Format(String),

    /// Local key-value storage failed.
    #[error("local storage error: {0}")]
    Storage(String),
}

impl ClientError {
    pub fn storage(err: impl core::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<DomainError> for ClientError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => ClientError::Validation(msg),
            DomainError::NotFound => ClientError::Validation("referenced record does not exist".to_string()),
        }
    }
}
