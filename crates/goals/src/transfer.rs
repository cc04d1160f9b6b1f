//! Export and import documents.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use goaltrack_core::{DomainError, DomainResult};

use crate::goal::{Goal, GoalDraft};

pub const EXPORT_FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportStats {
    pub total: usize,
    pub completed: usize,
}

/// Backup of a user's goals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub export_date: DateTime<Utc>,
    /// Email of the exporting user.
    pub user: String,
    pub goals: Vec<Goal>,
    pub stats: ExportStats,
}

impl ExportDocument {
    pub fn new(user_email: impl Into<String>, goals: &[Goal], exported_at: DateTime<Utc>) -> Self {
        Self {
            version: EXPORT_FORMAT_VERSION.to_string(),
            export_date: exported_at,
            user: user_email.into(),
            goals: goals.to_vec(),
            stats: ExportStats {
                total: goals.len(),
                completed: goals.iter().filter(|g| g.completed).count(),
            },
        }
    }

    pub fn to_pretty_json(&self) -> DomainResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DomainError::validation(format!("export serialization failed: {e}")))
    }
}

/// `goals-backup-YYYY-MM-DD.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("goals-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Any JSON document carrying a `goals` array.
///
/// Elements are kept raw so each one can succeed or fail on its own.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportDocument {
    pub goals: Vec<Value>,
}

impl ImportDocument {
    pub fn parse(text: &str) -> DomainResult<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| DomainError::validation(format!("import file is not valid JSON: {e}")))?;

        match value.get("goals") {
            Some(Value::Array(_)) => serde_json::from_value(value)
                .map_err(|e| DomainError::validation(format!("invalid import file: {e}"))),
            _ => Err(DomainError::validation(
                "invalid import file: expected a `goals` array",
            )),
        }
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    /// Decode one element as a draft. Identity, ownership and timestamps in
    /// the element are ignored; they are re-stamped on create.
    pub fn decode_draft(element: &Value) -> DomainResult<GoalDraft> {
        serde_json::from_value(element.clone())
            .map_err(|e| DomainError::validation(format!("invalid goal record: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::{Category, Priority};
    use chrono::TimeZone;
    use goaltrack_core::{GoalId, UserId};
    use serde_json::json;

    fn goal(id: &str, completed: bool) -> Goal {
        let mut goal = GoalDraft::new(id, NaiveDate::from_ymd_opt(2024, 8, 1).unwrap())
            .into_new_goal(UserId::parse("u").unwrap(), Utc::now())
            .unwrap()
            .into_goal(GoalId::parse(id).unwrap());
        goal.completed = completed;
        goal
    }

    #[test]
    fn export_document_shape() {
        let at = Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap();
        let doc = ExportDocument::new("me@example.com", &[goal("a", true), goal("b", false)], at);
        let value: Value = serde_json::from_str(&doc.to_pretty_json().unwrap()).unwrap();

        assert_eq!(value["version"], "1.0");
        assert_eq!(value["user"], "me@example.com");
        assert_eq!(value["exportDate"], "2024-05-10T08:00:00Z");
        assert_eq!(value["goals"].as_array().unwrap().len(), 2);
        assert_eq!(value["stats"], json!({ "total": 2, "completed": 1 }));
    }

    #[test]
    fn export_file_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        assert_eq!(export_file_name(date), "goals-backup-2024-01-09.json");
    }

    #[test]
    fn import_requires_goals_array() {
        assert!(ImportDocument::parse("not json").is_err());
        assert!(ImportDocument::parse(r#"{"items": []}"#).is_err());
        assert!(ImportDocument::parse(r#"{"goals": {}}"#).is_err());

        let doc = ImportDocument::parse(r#"{"anything": 1, "goals": [{}, {"title": "x"}]}"#).unwrap();
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn exported_goals_decode_back_into_drafts() {
        let doc = ExportDocument::new("me@example.com", &[goal("a", true)], Utc::now());
        let text = doc.to_pretty_json().unwrap();

        let imported = ImportDocument::parse(&text).unwrap();
        let draft = ImportDocument::decode_draft(&imported.goals[0]).unwrap();

        assert_eq!(draft.title, "a");
        assert_eq!(draft.category, Category::Skill);
        assert_eq!(draft.priority, Priority::Medium);
        assert_eq!(draft.deadline, NaiveDate::from_ymd_opt(2024, 8, 1));
    }

    #[test]
    fn malformed_element_fails_alone() {
        let doc = ImportDocument::parse(r#"{"goals": [{"title": "ok"}, {"priority": "urgent"}]}"#).unwrap();
        assert!(ImportDocument::decode_draft(&doc.goals[0]).is_ok());
        assert!(ImportDocument::decode_draft(&doc.goals[1]).is_err());
    }
}
