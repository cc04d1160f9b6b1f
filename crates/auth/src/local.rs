//! In-process session provider.
//!
//! Holds whatever token the account service handed out (seeded from config or
//! set by a sign-in flow) and enforces its validity window locally.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use goaltrack_core::{Clock, Notifier, Subscription, SystemClock, UserId};

use crate::claims::{SessionClaims, validate_claims};
use crate::session::{AuthError, SessionEvent, SessionProvider, SessionUser};

#[derive(Debug, Clone)]
struct ActiveSession {
    user: SessionUser,
    token: String,
    claims: SessionClaims,
}

pub struct LocalSession {
    active: RwLock<Option<ActiveSession>>,
    notifier: Notifier<SessionEvent>,
    clock: Arc<dyn Clock>,
}

impl LocalSession {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            active: RwLock::new(None),
            notifier: Notifier::new(),
            clock,
        }
    }

    /// Start a session for `user` with a token valid until `expires_at`.
    pub fn sign_in(&self, user: SessionUser, token: impl Into<String>, expires_at: DateTime<Utc>) {
        let claims = SessionClaims {
            sub: user.id.clone(),
            issued_at: self.clock.now(),
            expires_at,
        };
        let session = ActiveSession {
            user: user.clone(),
            token: token.into(),
            claims,
        };

        if let Ok(mut guard) = self.active.write() {
            *guard = Some(session);
        }

        tracing::info!(user_id = %user.id, "signed in");
        self.notifier.publish(SessionEvent::SignedIn(user));
    }

    pub fn sign_out(&self) {
        let previous = self.active.write().ok().and_then(|mut guard| guard.take());

        if let Some(session) = previous {
            tracing::info!(user_id = %session.user.id, "signed out");
            self.notifier.publish(SessionEvent::SignedOut);
        }
    }

    /// Swap in a fresh token for the current user.
    pub fn refresh(&self, token: impl Into<String>, expires_at: DateTime<Utc>) -> Result<(), AuthError> {
        let now = self.clock.now();
        let mut guard = self.active.write().map_err(|_| AuthError::NoSession)?;
        let session = guard.as_mut().ok_or(AuthError::NoSession)?;

        session.token = token.into();
        session.claims.issued_at = now;
        session.claims.expires_at = expires_at;
        drop(guard);

        tracing::debug!("session token refreshed");
        self.notifier.publish(SessionEvent::TokenRefreshed);
        Ok(())
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.current_user().map(|u| u.id)
    }
}

impl Default for LocalSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionProvider for LocalSession {
    fn current_user(&self) -> Option<SessionUser> {
        self.active
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|s| s.user.clone()))
    }

    async fn token(&self) -> Result<String, AuthError> {
        let session = self
            .active
            .read()
            .ok()
            .and_then(|guard| guard.clone())
            .ok_or(AuthError::NoSession)?;

        validate_claims(&session.claims, self.clock.now())?;
        Ok(session.token)
    }

    fn subscribe(&self) -> Subscription<SessionEvent> {
        self.notifier.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use goaltrack_core::FixedClock;

    fn user() -> SessionUser {
        SessionUser {
            id: UserId::parse("user-42").unwrap(),
            email: "ada@example.com".to_string(),
        }
    }

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()))
    }

    #[tokio::test]
    async fn token_requires_a_session() {
        let session = LocalSession::with_clock(clock());
        assert_eq!(session.token().await, Err(AuthError::NoSession));
        assert_eq!(session.current_user_id(), Err(AuthError::NoSession));
    }

    #[tokio::test]
    async fn sign_in_issues_token_and_notifies() {
        let clock = clock();
        let session = LocalSession::with_clock(clock.clone());
        let events = session.subscribe();

        session.sign_in(user(), "tok-1", clock.now() + Duration::hours(1));

        assert_eq!(session.token().await.unwrap(), "tok-1");
        assert_eq!(session.current_user(), Some(user()));
        assert_eq!(events.try_recv().unwrap(), SessionEvent::SignedIn(user()));
    }

    #[tokio::test]
    async fn expired_token_is_refused_until_refreshed() {
        let clock = clock();
        let session = LocalSession::with_clock(clock.clone());
        session.sign_in(user(), "tok-1", clock.now() + Duration::minutes(30));

        clock.advance(Duration::minutes(31));
        let err = session.token().await.unwrap_err();
        assert!(err.is_expired());

        session.refresh("tok-2", clock.now() + Duration::hours(1)).unwrap();
        assert_eq!(session.token().await.unwrap(), "tok-2");
    }

    #[tokio::test]
    async fn sign_out_clears_session_once() {
        let clock = clock();
        let session = LocalSession::with_clock(clock.clone());
        let events = session.subscribe();
        session.sign_in(user(), "tok-1", clock.now() + Duration::hours(1));

        session.sign_out();
        session.sign_out();

        assert_eq!(session.current_user(), None);
        assert_eq!(
            events.drain(),
            vec![SessionEvent::SignedIn(user()), SessionEvent::SignedOut]
        );
    }

    #[test]
    fn refresh_without_session_fails() {
        let session = LocalSession::new();
        assert_eq!(session.refresh("t", Utc::now()), Err(AuthError::NoSession));
    }
}
