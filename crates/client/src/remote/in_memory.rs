//! In-process goal store.
//!
//! Behaves like the real store (assigns ids, scopes by owner) and can be told
//! to fail, which is what the synchronizer tests and offline demos need.

use std::collections::HashSet;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use goaltrack_core::{GoalId, UserId};
use goaltrack_goals::{Goal, NewGoal};

use super::{FieldUpdate, RemoteError, RemoteGoalStore};

#[derive(Debug, Default)]
pub struct InMemoryGoalStore {
    goals: RwLock<Vec<Goal>>,
    offline: AtomicBool,
    create_calls: AtomicUsize,
    failing_creates: RwLock<HashSet<usize>>,
    failing_ids: RwLock<HashSet<GoalId>>,
}

impl InMemoryGoalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with already persisted goals.
    pub fn with_goals(goals: Vec<Goal>) -> Self {
        Self {
            goals: RwLock::new(goals),
            ..Self::default()
        }
    }

    /// While offline every call fails with `RemoteError::Network`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Fail the n-th `create` call (1-based, counted over the store lifetime).
    pub fn fail_create_call(&self, call: usize) {
        if let Ok(mut set) = self.failing_creates.write() {
            set.insert(call);
        }
    }

    /// Fail every update or delete addressed to `id`.
    pub fn fail_goal(&self, id: GoalId) {
        if let Ok(mut set) = self.failing_ids.write() {
            set.insert(id);
        }
    }

    pub fn goals(&self) -> Vec<Goal> {
        self.goals.read().map(|g| g.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.goals.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_online(&self) -> Result<(), RemoteError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Network("in-memory store is offline".to_string()));
        }
        Ok(())
    }

    fn check_goal(&self, id: &GoalId) -> Result<(), RemoteError> {
        let failing = self
            .failing_ids
            .read()
            .map(|set| set.contains(id))
            .unwrap_or(false);
        if failing {
            return Err(RemoteError::Api {
                status: 500,
                message: format!("injected failure for goal {id}"),
            });
        }
        Ok(())
    }

    fn poisoned() -> RemoteError {
        RemoteError::Network("in-memory store lock poisoned".to_string())
    }
}

#[async_trait]
impl RemoteGoalStore for InMemoryGoalStore {
    async fn list_by_user(&self, user_id: &UserId, _token: &str) -> Result<Vec<Goal>, RemoteError> {
        self.check_online()?;
        let goals = self.goals.read().map_err(|_| Self::poisoned())?;
        Ok(goals.iter().filter(|g| &g.user_id == user_id).cloned().collect())
    }

    async fn create(&self, goal: &NewGoal, _token: &str) -> Result<Goal, RemoteError> {
        self.check_online()?;
        let call = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let failing = self
            .failing_creates
            .read()
            .map(|set| set.contains(&call))
            .unwrap_or(false);
        if failing {
            return Err(RemoteError::Api {
                status: 500,
                message: format!("injected failure for create call {call}"),
            });
        }

        let id = GoalId::parse(Uuid::now_v7().to_string())
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;
        let created = goal.clone().into_goal(id);

        let mut goals = self.goals.write().map_err(|_| Self::poisoned())?;
        goals.push(created.clone());
        Ok(created)
    }

    async fn replace_fields(&self, id: &GoalId, update: &FieldUpdate, _token: &str) -> Result<(), RemoteError> {
        self.check_online()?;
        self.check_goal(id)?;

        let mut goals = self.goals.write().map_err(|_| Self::poisoned())?;
        let goal = goals.iter_mut().find(|g| &g.id == id).ok_or_else(|| RemoteError::Api {
            status: 404,
            message: format!("goal {id} not found"),
        })?;
        goal.apply_patch(&update.patch, update.updated_at);
        Ok(())
    }

    async fn delete(&self, id: &GoalId, _token: &str) -> Result<(), RemoteError> {
        self.check_online()?;
        self.check_goal(id)?;

        let mut goals = self.goals.write().map_err(|_| Self::poisoned())?;
        let before = goals.len();
        goals.retain(|g| &g.id != id);
        if goals.len() == before {
            return Err(RemoteError::Api {
                status: 404,
                message: format!("goal {id} not found"),
            });
        }
        Ok(())
    }
}
