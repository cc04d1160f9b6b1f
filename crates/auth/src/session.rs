//! Session Provider contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use goaltrack_core::{Subscription, UserId};

use crate::claims::TokenValidationError;

/// The signed-in account, as reported by the session provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub email: String,
}

/// Session-changed notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(SessionUser),
    SignedOut,
    TokenRefreshed,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Nobody is signed in.
    #[error("no active session; please sign in")]
    NoSession,

    /// The held token can no longer be used; re-authentication is required.
    #[error("session token rejected: {0}")]
    InvalidToken(#[from] TokenValidationError),
}

impl AuthError {
    pub fn is_expired(&self) -> bool {
        matches!(self, AuthError::InvalidToken(TokenValidationError::Expired))
    }
}

/// Issues bearer tokens and reports who is signed in.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    fn current_user(&self) -> Option<SessionUser>;

    /// Bearer token for the active session. May suspend while a token is
    /// refreshed; fails with `AuthError` when there is no usable session.
    async fn token(&self) -> Result<String, AuthError>;

    /// Stream of sign-in / sign-out notifications.
    fn subscribe(&self) -> Subscription<SessionEvent>;

    fn current_user_id(&self) -> Result<UserId, AuthError> {
        self.current_user().map(|u| u.id).ok_or(AuthError::NoSession)
    }
}
