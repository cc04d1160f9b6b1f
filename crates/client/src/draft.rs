//! Autosave for a half-filled goal form.

use std::sync::Arc;

use goaltrack_goals::GoalDraft;

use crate::error::{ClientError, ClientResult};
use crate::store::KeyValueStore;

pub const DRAFT_KEY: &str = "goalDraft";

/// Single-slot draft storage with restore-once semantics.
#[derive(Clone)]
pub struct DraftStore {
    store: Arc<dyn KeyValueStore>,
}

impl DraftStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Overwrite the saved draft.
    pub async fn save(&self, draft: &GoalDraft) -> ClientResult<()> {
        let json = serde_json::to_string(draft).map_err(ClientError::storage)?;
        self.store.put(DRAFT_KEY, &json).await.map_err(ClientError::storage)
    }

    /// Return the saved draft and forget it. An unreadable draft is dropped.
    pub async fn take(&self) -> ClientResult<Option<GoalDraft>> {
        let raw = self.store.get(DRAFT_KEY).await.map_err(ClientError::storage)?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        self.discard().await?;

        match serde_json::from_str(&raw) {
            Ok(draft) => Ok(Some(draft)),
            Err(err) => {
                tracing::warn!("dropping unreadable goal draft: {err}");
                Ok(None)
            }
        }
    }

    pub async fn discard(&self) -> ClientResult<()> {
        self.store.remove(DRAFT_KEY).await.map_err(ClientError::storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use goaltrack_goals::Priority;

    #[tokio::test]
    async fn draft_is_restored_once() {
        let drafts = DraftStore::new(Arc::new(MemoryStore::new()));
        let draft = GoalDraft {
            title: "Learn to juggle".to_string(),
            priority: Priority::Low,
            ..GoalDraft::default()
        };

        drafts.save(&draft).await.unwrap();
        assert_eq!(drafts.take().await.unwrap(), Some(draft));
        assert_eq!(drafts.take().await.unwrap(), None);
    }

    #[tokio::test]
    async fn unreadable_draft_is_dropped() {
        let store = Arc::new(MemoryStore::new());
        store.put(DRAFT_KEY, "[1, 2").await.unwrap();

        let drafts = DraftStore::new(store.clone());
        assert_eq!(drafts.take().await.unwrap(), None);
        assert!(store.is_empty());
    }
}
