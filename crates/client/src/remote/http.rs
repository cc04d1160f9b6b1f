//! HTTP/JSON adapter for the remote goal store.
//!
//! Routes (relative to the API base URL):
//! - `GET    /goals?userId={id}`
//! - `POST   /goals`
//! - `PUT    /goals/{id}`
//! - `DELETE /goals/{id}`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};

use goaltrack_core::{GoalId, UserId};
use goaltrack_goals::{Goal, NewGoal};

use super::{FieldUpdate, RemoteError, RemoteGoalStore};

#[derive(Debug, Clone)]
pub struct HttpGoalStore {
    client: Client,
    base_url: Url,
}

impl HttpGoalStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let raw = base_url.into();
        let base_url = Url::parse(raw.trim())
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| RemoteError::Network(format!("invalid API base URL `{raw}`")))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    fn goals_url(&self) -> Url {
        self.url_with(&["goals"])
    }

    fn goal_url(&self, id: &GoalId) -> Url {
        self.url_with(&["goals", id.as_str()])
    }

    /// Base URL plus percent-encoded path segments.
    fn url_with(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

fn transport(err: reqwest::Error) -> RemoteError {
    if err.is_decode() {
        RemoteError::Parse(err.to_string())
    } else {
        RemoteError::Network(err.to_string())
    }
}

async fn check_status(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(RemoteError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl RemoteGoalStore for HttpGoalStore {
    async fn list_by_user(&self, user_id: &UserId, token: &str) -> Result<Vec<Goal>, RemoteError> {
        let response = self
            .client
            .get(self.goals_url())
            .query(&[("userId", user_id.as_str())])
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;

        let goals: Vec<Goal> = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()))?;

        tracing::debug!(user_id = %user_id, count = goals.len(), "listed goals");
        Ok(goals)
    }

    async fn create(&self, goal: &NewGoal, token: &str) -> Result<Goal, RemoteError> {
        let response = self
            .client
            .post(self.goals_url())
            .bearer_auth(token)
            .json(goal)
            .send()
            .await
            .map_err(transport)?;

        let created: Goal = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()))?;

        tracing::debug!(goal_id = %created.id, "created goal");
        Ok(created)
    }

    async fn replace_fields(&self, id: &GoalId, update: &FieldUpdate, token: &str) -> Result<(), RemoteError> {
        let response = self
            .client
            .put(self.goal_url(id))
            .bearer_auth(token)
            .json(update)
            .send()
            .await
            .map_err(transport)?;

        check_status(response).await?;
        Ok(())
    }

    async fn delete(&self, id: &GoalId, token: &str) -> Result<(), RemoteError> {
        let response = self
            .client
            .delete(self.goal_url(id))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;

        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_built_from_a_normalized_base() {
        let store = HttpGoalStore::new("http://localhost:5000/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(store.goals_url().as_str(), "http://localhost:5000/api/goals");
        assert_eq!(
            store.goal_url(&GoalId::parse("abc").unwrap()).as_str(),
            "http://localhost:5000/api/goals/abc"
        );
    }

    #[test]
    fn goal_ids_are_percent_encoded_in_the_path() {
        let store = HttpGoalStore::new("http://localhost:5000/api", Duration::from_secs(5)).unwrap();
        let url = store.goal_url(&GoalId::parse("a/b c?").unwrap());
        assert_eq!(url.as_str(), "http://localhost:5000/api/goals/a%2Fb%20c%3F");
    }

    #[test]
    fn unusable_base_url_is_rejected() {
        assert!(HttpGoalStore::new("not a url", Duration::from_secs(5)).is_err());
        assert!(HttpGoalStore::new("mailto:me@example.com", Duration::from_secs(5)).is_err());
    }
}
