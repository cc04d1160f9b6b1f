//! Wiring of the client stack for one CLI invocation.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;

use goaltrack_auth::{LocalSession, SessionProvider};
use goaltrack_client::{
    ClientConfig, DraftStore, GoalSynchronizer, HttpGoalStore, KeyValueStore, LocalCache, SqliteStore,
};

pub struct AppContext {
    pub sync: GoalSynchronizer,
    pub session: Arc<LocalSession>,
    pub store: Arc<dyn KeyValueStore>,
}

impl AppContext {
    /// Build the stack and sign in with the configured session, if any.
    pub fn build(config: &ClientConfig) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::new(config.store_path()));
        let remote = Arc::new(
            HttpGoalStore::new(config.api_url.clone(), config.http_timeout)
                .context("failed to build HTTP client")?,
        );
        let session = Arc::new(LocalSession::new());

        if let Some(seed) = &config.session {
            // Tokens handed in through the environment carry no expiry of
            // their own; the remote store is the one that rejects them.
            session.sign_in(seed.user.clone(), seed.token.clone(), DateTime::<Utc>::MAX_UTC);
        }

        let sync = GoalSynchronizer::new(remote, session.clone(), LocalCache::new(store.clone()));

        Ok(Self { sync, session, store })
    }

    pub fn drafts(&self) -> DraftStore {
        DraftStore::new(self.store.clone())
    }

    /// Load the signed-in user's goals, reporting degraded mode.
    pub async fn load(&mut self) -> Result<()> {
        let user_id = self
            .session
            .current_user_id()
            .context("not signed in; set GOALTRACK_TOKEN and GOALTRACK_USER_ID")?;

        let outcome = self.sync.list(&user_id).await?;
        if let Some(warning) = &outcome.warning {
            eprintln!("{} {}", "warning:".yellow().bold(), warning);
        }
        Ok(())
    }
}
