use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use goaltrack_core::{DomainError, DomainResult, GoalId, UserId};

/// Goal category (fixed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Skill,
    Health,
    Career,
    Personal,
    Finance,
    Education,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Skill,
        Category::Health,
        Category::Career,
        Category::Personal,
        Category::Finance,
        Category::Education,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Skill => "skill",
            Category::Health => "health",
            Category::Career => "career",
            Category::Personal => "personal",
            Category::Finance => "finance",
            Category::Education => "education",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Skill => "Skill Development",
            Category::Health => "Health & Fitness",
            Category::Career => "Career",
            Category::Personal => "Personal",
            Category::Finance => "Finance",
            Category::Education => "Education",
        }
    }
}

/// Goal priority.
///
/// Variant order is the sort order: high sorts before medium, medium before low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    /// Position in the sort order (0 = first).
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

/// Reminder cadence. Advisory metadata only; nothing schedules it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Reminder {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Reminder {
    pub const ALL: [Reminder; 4] = [Reminder::None, Reminder::Daily, Reminder::Weekly, Reminder::Monthly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Reminder::None => "none",
            Reminder::Daily => "daily",
            Reminder::Weekly => "weekly",
            Reminder::Monthly => "monthly",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Reminder::None => "No Reminder",
            Reminder::Daily => "Daily",
            Reminder::Weekly => "Weekly",
            Reminder::Monthly => "Monthly",
        }
    }
}

macro_rules! impl_keyword_enum {
    ($t:ty, $what:literal) => {
        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl core::str::FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_lowercase();
                <$t>::ALL
                    .into_iter()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| DomainError::validation(format!("unknown {}: `{}`", $what, s)))
            }
        }
    };
}

impl_keyword_enum!(Category, "category");
impl_keyword_enum!(Priority, "priority");
impl_keyword_enum!(Reminder, "reminder");

/// A persisted goal, as returned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    #[serde(alias = "_id")]
    pub id: GoalId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: Category,
    pub priority: Priority,
    #[serde(with = "deadline_format")]
    pub deadline: NaiveDate,
    #[serde(default)]
    pub reminder: Reminder,
    #[serde(default)]
    pub completed: bool,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Start of the deadline day, as an instant (UTC midnight).
    pub fn deadline_start(&self) -> DateTime<Utc> {
        self.deadline.and_time(NaiveTime::MIN).and_utc()
    }

    /// Pending and past its deadline.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.deadline_start() < now
    }

    /// Whole days from `today` until the deadline; negative once it has passed.
    pub fn days_left(&self, today: NaiveDate) -> i64 {
        (self.deadline - today).num_days()
    }

    /// Timestamp for the next mutation.
    ///
    /// Never earlier than `created_at` and always strictly after the previous
    /// `updated_at`, even if the clock has not moved.
    pub fn next_update_stamp(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.max(self.updated_at + Duration::milliseconds(1)).max(self.created_at)
    }

    /// Merge a patch into this record. Identity and ownership are untouched.
    pub fn apply_patch(&mut self, patch: &GoalPatch, updated_at: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = &patch.description {
            self.description = normalize_description(Some(description.clone()));
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = deadline;
        }
        if let Some(reminder) = patch.reminder {
            self.reminder = reminder;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        self.updated_at = updated_at;
    }
}

/// Field set of a goal before the remote store has assigned it an id.
///
/// Every field is optional on the wire so that half-filled forms and imported
/// records can be decoded; `validate` decides whether it can be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GoalDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, with = "deadline_format::option", skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub reminder: Reminder,
}

impl GoalDraft {
    pub fn new(title: impl Into<String>, deadline: NaiveDate) -> Self {
        Self {
            title: title.into(),
            deadline: Some(deadline),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("goal title is required"));
        }
        if self.deadline.is_none() {
            return Err(DomainError::validation("goal deadline is required"));
        }
        Ok(())
    }

    /// Stamp ownership and timestamps, producing the record sent on create.
    pub fn into_new_goal(self, user_id: UserId, now: DateTime<Utc>) -> DomainResult<NewGoal> {
        self.validate()?;
        let deadline = self
            .deadline
            .ok_or_else(|| DomainError::validation("goal deadline is required"))?;

        Ok(NewGoal {
            title: self.title.trim().to_string(),
            description: normalize_description(self.description),
            category: self.category,
            priority: self.priority,
            deadline,
            reminder: self.reminder,
            completed: false,
            user_id,
            created_at: now,
            updated_at: now,
        })
    }
}

/// A validated, stamped goal awaiting its store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: Category,
    pub priority: Priority,
    #[serde(with = "deadline_format")]
    pub deadline: NaiveDate,
    pub reminder: Reminder,
    pub completed: bool,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewGoal {
    pub fn into_goal(self, id: GoalId) -> Goal {
        Goal {
            id,
            title: self.title,
            description: self.description,
            category: self.category,
            priority: self.priority,
            deadline: self.deadline,
            reminder: self.reminder,
            completed: self.completed,
            user_id: self.user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Partial update of a goal's editable fields.
///
/// An empty `description` clears it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GoalPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, with = "deadline_format::option", skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<Reminder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl GoalPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn validate(&self) -> DomainResult<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(DomainError::validation("goal title cannot be empty"));
            }
        }
        Ok(())
    }

    /// The patch as it is stored: title trimmed, a blank description
    /// reduced to the empty string that clears it.
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.map(|t| t.trim().to_string()),
            description: self
                .description
                .map(|d| normalize_description(Some(d)).unwrap_or_default()),
            ..self
        }
    }
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

/// Deadlines travel as `YYYY-MM-DD`; stores that echo a full timestamp
/// (`2024-05-01T00:00:00.000Z`) are accepted and truncated to the date.
pub(crate) mod deadline_format {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveDate, String> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, FORMAT) {
            return Ok(date);
        }
        let has_time = matches!(raw.as_bytes().get(10), Some(b'T') | Some(b' '));
        raw.get(..10)
            .filter(|_| has_time)
            .and_then(|date| NaiveDate::parse_from_str(date, FORMAT).ok())
            .ok_or_else(|| format!("invalid deadline `{raw}`"))
    }

    pub mod option {
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            date: &Option<NaiveDate>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => super::serialize(date, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDate>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) if !raw.trim().is_empty() => {
                    super::parse(&raw).map(Some).map_err(serde::de::Error::custom)
                }
                _ => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn user() -> UserId {
        UserId::parse("user-1").unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_goal() -> Goal {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        GoalDraft::new("Run a 10k", date(2024, 6, 1))
            .into_new_goal(user(), created)
            .unwrap()
            .into_goal(GoalId::parse("g-1").unwrap())
    }

    #[test]
    fn draft_with_blank_title_is_rejected() {
        let draft = GoalDraft::new("   ", date(2024, 6, 1));
        let err = draft.into_new_goal(user(), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn draft_without_deadline_is_rejected() {
        let draft = GoalDraft {
            title: "Read more".to_string(),
            ..GoalDraft::default()
        };
        assert!(matches!(draft.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn new_goal_is_stamped_pending_and_owned() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let mut draft = GoalDraft::new("  Learn Rust  ", date(2024, 7, 1));
        draft.description = Some("   ".to_string());

        let new_goal = draft.into_new_goal(user(), now).unwrap();

        assert_eq!(new_goal.title, "Learn Rust");
        assert_eq!(new_goal.description, None);
        assert!(!new_goal.completed);
        assert_eq!(new_goal.user_id, user());
        assert_eq!(new_goal.created_at, now);
        assert_eq!(new_goal.updated_at, now);
    }

    #[test]
    fn goal_uses_camel_case_wire_format() {
        let value = serde_json::to_value(sample_goal()).unwrap();
        assert_eq!(value["id"], "g-1");
        assert_eq!(value["userId"], "user-1");
        assert_eq!(value["deadline"], "2024-06-01");
        assert_eq!(value["priority"], "medium");
        assert_eq!(value["reminder"], "none");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("description").is_none());
    }

    #[test]
    fn goal_accepts_underscore_id_and_timestamp_deadline() {
        let goal: Goal = serde_json::from_value(json!({
            "_id": "65a1",
            "title": "Save money",
            "category": "finance",
            "priority": "high",
            "deadline": "2024-12-31T00:00:00.000Z",
            "userId": "user-1",
            "createdAt": "2024-01-01T10:00:00Z",
            "updatedAt": "2024-01-02T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(goal.id.as_str(), "65a1");
        assert_eq!(goal.deadline, date(2024, 12, 31));
        assert_eq!(goal.reminder, Reminder::None);
        assert!(!goal.completed);
    }

    #[test]
    fn malformed_deadline_is_a_decode_error() {
        let result = serde_json::from_value::<GoalDraft>(json!({
            "title": "x",
            "deadline": "next tuesday"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn empty_deadline_in_draft_decodes_as_missing() {
        let draft: GoalDraft = serde_json::from_value(json!({ "title": "x", "deadline": "" })).unwrap();
        assert_eq!(draft.deadline, None);
    }

    #[test]
    fn patch_merges_only_present_fields() {
        let mut goal = sample_goal();
        let before = goal.clone();
        let stamp = goal.next_update_stamp(before.updated_at);

        let patch = GoalPatch {
            priority: Some(Priority::High),
            description: Some("with friends".to_string()),
            ..GoalPatch::default()
        };
        goal.apply_patch(&patch, stamp);

        assert_eq!(goal.priority, Priority::High);
        assert_eq!(goal.description.as_deref(), Some("with friends"));
        assert_eq!(goal.title, before.title);
        assert_eq!(goal.id, before.id);
        assert_eq!(goal.user_id, before.user_id);
        assert_eq!(goal.created_at, before.created_at);
        assert!(goal.updated_at > before.updated_at);

        goal.apply_patch(&GoalPatch { description: Some(String::new()), ..GoalPatch::default() }, stamp);
        assert_eq!(goal.description, None);
    }

    #[test]
    fn patch_rejects_blank_title() {
        let patch = GoalPatch {
            title: Some(" ".to_string()),
            ..GoalPatch::default()
        };
        assert!(matches!(patch.validate(), Err(DomainError::Validation(_))));
        assert!(GoalPatch::default().is_empty());
        assert!(!GoalPatch::completed(true).is_empty());
    }

    #[test]
    fn normalized_patch_matches_what_apply_patch_stores() {
        let patch = GoalPatch {
            title: Some("  padded  ".to_string()),
            description: Some("   ".to_string()),
            priority: Some(Priority::Low),
            ..GoalPatch::default()
        }
        .normalized();

        assert_eq!(patch.title.as_deref(), Some("padded"));
        assert_eq!(patch.description.as_deref(), Some(""));
        assert_eq!(patch.priority, Some(Priority::Low));

        let mut raw = sample_goal();
        let mut clean = sample_goal();
        let stamp = raw.next_update_stamp(raw.updated_at);
        raw.apply_patch(
            &GoalPatch {
                title: Some("  padded  ".to_string()),
                description: Some("   ".to_string()),
                priority: Some(Priority::Low),
                ..GoalPatch::default()
            },
            stamp,
        );
        clean.apply_patch(&patch, stamp);
        assert_eq!(raw, clean);
        assert_eq!(clean.title, "padded");
        assert_eq!(clean.description, None);
    }

    #[test]
    fn update_stamp_strictly_increases_under_a_frozen_clock() {
        let goal = sample_goal();
        let frozen = goal.updated_at;
        let stamp = goal.next_update_stamp(frozen);
        assert!(stamp > goal.updated_at);
        assert!(stamp >= goal.created_at);
    }

    #[test]
    fn overdue_requires_pending_and_past_deadline() {
        let mut goal = sample_goal();
        let after = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2024, 5, 31, 12, 0, 0).unwrap();

        assert!(goal.is_overdue(after));
        assert!(!goal.is_overdue(before));

        goal.completed = true;
        assert!(!goal.is_overdue(after));
    }

    #[test]
    fn days_left_is_signed() {
        let goal = sample_goal();
        assert_eq!(goal.days_left(date(2024, 5, 25)), 7);
        assert_eq!(goal.days_left(date(2024, 6, 1)), 0);
        assert_eq!(goal.days_left(date(2024, 6, 4)), -3);
    }

    #[test]
    fn keyword_enums_parse_case_insensitively() {
        assert_eq!("Career".parse::<Category>().unwrap(), Category::Career);
        assert_eq!("LOW".parse::<Priority>().unwrap(), Priority::Low);
        assert_eq!("weekly".parse::<Reminder>().unwrap(), Reminder::Weekly);
        assert!("someday".parse::<Priority>().is_err());
        assert_eq!(Category::Health.display_name(), "Health & Fitness");
    }

    #[test]
    fn priority_order_is_high_medium_low() {
        assert!(Priority::High < Priority::Medium);
        assert!(Priority::Medium < Priority::Low);
        assert_eq!(Priority::Low.rank(), 2);
    }
}
