//! Remote goal store boundary.
//!
//! The remote store is the source of truth. Each call is independent; there
//! is no transaction spanning calls.

mod http;
mod in_memory;

pub use http::HttpGoalStore;
pub use in_memory::InMemoryGoalStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use goaltrack_core::{GoalId, UserId};
use goaltrack_goals::{Goal, GoalPatch, NewGoal};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Transport failure (unreachable, timeout, connection reset).
    #[error("remote store unreachable: {0}")]
    Network(String),

    /// The store answered with a non-success status.
    #[error("remote store rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("unreadable response from remote store: {0}")]
    Parse(String),

    /// The response decoded but violates the store contract.
    #[error("invalid response from remote store: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    /// Whether the failure means "the store is not there right now", as
    /// opposed to "the store refused this request".
    pub fn is_unreachable(&self) -> bool {
        match self {
            RemoteError::Network(_) => true,
            RemoteError::Api { status, .. } => *status >= 500,
            RemoteError::Parse(_) | RemoteError::InvalidResponse(_) => false,
        }
    }
}

/// Body of a field replacement: the changed fields plus the new `updatedAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldUpdate {
    #[serde(flatten)]
    pub patch: GoalPatch,
    pub updated_at: DateTime<Utc>,
}

impl FieldUpdate {
    pub fn new(patch: GoalPatch, updated_at: DateTime<Utc>) -> Self {
        Self { patch, updated_at }
    }
}

/// CRUD surface of the remote goal store. Every call carries the caller's
/// bearer token.
#[async_trait]
pub trait RemoteGoalStore: Send + Sync {
    /// All goals owned by `user_id`, in store order.
    async fn list_by_user(&self, user_id: &UserId, token: &str) -> Result<Vec<Goal>, RemoteError>;

    /// Persist a new goal; the returned record carries the store-assigned id.
    async fn create(&self, goal: &NewGoal, token: &str) -> Result<Goal, RemoteError>;

    /// Replace the fields named in `update`. Fields not named are untouched.
    async fn replace_fields(&self, id: &GoalId, update: &FieldUpdate, token: &str) -> Result<(), RemoteError>;

    async fn delete(&self, id: &GoalId, token: &str) -> Result<(), RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use goaltrack_goals::Priority;

    #[test]
    fn field_update_flattens_patch_fields() {
        let update = FieldUpdate::new(
            GoalPatch {
                priority: Some(Priority::Low),
                ..GoalPatch::default()
            },
            DateTime::parse_from_rfc3339("2024-05-10T08:00:00Z").unwrap().with_timezone(&Utc),
        );
        let value = serde_json::to_value(&update).unwrap();

        assert_eq!(value["priority"], "low");
        assert_eq!(value["updatedAt"], "2024-05-10T08:00:00Z");
        assert!(value.get("title").is_none());
        assert!(value.get("patch").is_none());
    }

    #[test]
    fn unreachable_covers_transport_and_server_faults() {
        assert!(RemoteError::Network("refused".into()).is_unreachable());
        assert!(RemoteError::Api { status: 503, message: String::new() }.is_unreachable());
        assert!(!RemoteError::Api { status: 404, message: String::new() }.is_unreachable());
        assert!(!RemoteError::Parse("eof".into()).is_unreachable());
    }
}
