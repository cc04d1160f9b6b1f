//! Last-known-good snapshot of the goal collection.
//!
//! Written after every successful remote read and read back only when the
//! remote store cannot be reached. Never consulted otherwise.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use goaltrack_core::UserId;
use goaltrack_goals::Goal;

use crate::error::{ClientError, ClientResult};
use crate::store::KeyValueStore;

pub const GOALS_CACHE_KEY: &str = "goalTracker_goalsCache.v1";

/// Bumped whenever the snapshot layout changes; older snapshots are ignored.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSnapshot {
    pub schema_version: u32,
    pub user_id: UserId,
    pub saved_at: DateTime<Utc>,
    pub goals: Vec<Goal>,
}

impl GoalSnapshot {
    pub fn new(user_id: UserId, goals: Vec<Goal>, saved_at: DateTime<Utc>) -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            user_id,
            saved_at,
            goals,
        }
    }
}

#[derive(Clone)]
pub struct LocalCache {
    store: Arc<dyn KeyValueStore>,
}

impl LocalCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Overwrite the snapshot.
    pub async fn write(&self, snapshot: &GoalSnapshot) -> ClientResult<()> {
        let json = serde_json::to_string(snapshot).map_err(ClientError::storage)?;
        self.store
            .put(GOALS_CACHE_KEY, &json)
            .await
            .map_err(ClientError::storage)?;
        tracing::debug!(count = snapshot.goals.len(), "goal snapshot written");
        Ok(())
    }

    /// Read the snapshot, whoever it belongs to.
    ///
    /// Missing, unreadable or outdated snapshots all read as `None`.
    pub async fn read(&self) -> Option<GoalSnapshot> {
        let raw = match self.store.get(GOALS_CACHE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!("failed to read goal snapshot: {err:?}");
                return None;
            }
        };

        let snapshot: GoalSnapshot = match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!("ignoring unreadable goal snapshot: {err}");
                return None;
            }
        };

        if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
            tracing::warn!(
                found = snapshot.schema_version,
                expected = SNAPSHOT_SCHEMA_VERSION,
                "ignoring goal snapshot with unknown schema version"
            );
            return None;
        }

        Some(snapshot)
    }

    /// Read the snapshot only if it was written for `user_id`.
    pub async fn read_for(&self, user_id: &UserId) -> Option<GoalSnapshot> {
        let snapshot = self.read().await?;
        if &snapshot.user_id != user_id {
            tracing::warn!("ignoring goal snapshot written for another user");
            return None;
        }
        Some(snapshot)
    }

    pub async fn clear(&self) -> ClientResult<()> {
        self.store
            .remove(GOALS_CACHE_KEY)
            .await
            .map_err(ClientError::storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use goaltrack_core::GoalId;
    use goaltrack_goals::GoalDraft;

    fn user(id: &str) -> UserId {
        UserId::parse(id).unwrap()
    }

    fn goal(id: &str) -> Goal {
        GoalDraft::new(id, NaiveDate::from_ymd_opt(2024, 9, 1).unwrap())
            .into_new_goal(user("u1"), Utc::now())
            .unwrap()
            .into_goal(GoalId::parse(id).unwrap())
    }

    fn cache() -> (Arc<MemoryStore>, LocalCache) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), LocalCache::new(store))
    }

    #[tokio::test]
    async fn snapshot_round_trips_for_its_owner() {
        let (_, cache) = cache();
        let snapshot = GoalSnapshot::new(user("u1"), vec![goal("a"), goal("b")], Utc::now());
        cache.write(&snapshot).await.unwrap();

        assert_eq!(cache.read_for(&user("u1")).await, Some(snapshot));
        assert_eq!(cache.read_for(&user("u2")).await, None);
    }

    #[tokio::test]
    async fn corrupt_or_outdated_snapshots_read_as_missing() {
        let (store, cache) = cache();

        store.put(GOALS_CACHE_KEY, "{not json").await.unwrap();
        assert_eq!(cache.read().await, None);

        let mut snapshot = GoalSnapshot::new(user("u1"), vec![goal("a")], Utc::now());
        snapshot.schema_version = SNAPSHOT_SCHEMA_VERSION + 1;
        store
            .put(GOALS_CACHE_KEY, &serde_json::to_string(&snapshot).unwrap())
            .await
            .unwrap();
        assert_eq!(cache.read().await, None);
    }

    #[tokio::test]
    async fn clear_removes_the_snapshot() {
        let (store, cache) = cache();
        cache
            .write(&GoalSnapshot::new(user("u1"), vec![], Utc::now()))
            .await
            .unwrap();
        cache.clear().await.unwrap();
        assert!(store.is_empty());
    }
}
