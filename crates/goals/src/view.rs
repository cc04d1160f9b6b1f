//! Filter and sort policy for derived goal views.
//!
//! Views borrow from the owned collection; nothing here mutates it.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use goaltrack_core::DomainError;

use crate::goal::Goal;

/// Which goals a view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalFilter {
    #[default]
    All,
    /// Deadline is today.
    Today,
    /// Deadline within `[today, today + 7 days]`.
    Week,
    /// Deadline within `[today, today + 30 days]`.
    Month,
    Completed,
    Pending,
}

impl GoalFilter {
    pub const ALL: [GoalFilter; 6] = [
        GoalFilter::All,
        GoalFilter::Today,
        GoalFilter::Week,
        GoalFilter::Month,
        GoalFilter::Completed,
        GoalFilter::Pending,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalFilter::All => "all",
            GoalFilter::Today => "today",
            GoalFilter::Week => "week",
            GoalFilter::Month => "month",
            GoalFilter::Completed => "completed",
            GoalFilter::Pending => "pending",
        }
    }

    /// `today` is the reference day (start of the current local day).
    pub fn matches(&self, goal: &Goal, today: NaiveDate) -> bool {
        match self {
            GoalFilter::All => true,
            GoalFilter::Today => goal.deadline == today,
            GoalFilter::Week => due_within(goal, today, 7),
            GoalFilter::Month => due_within(goal, today, 30),
            GoalFilter::Completed => goal.completed,
            GoalFilter::Pending => !goal.completed,
        }
    }
}

fn due_within(goal: &Goal, today: NaiveDate, days: u64) -> bool {
    let end = today.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX);
    goal.deadline >= today && goal.deadline <= end
}

/// Ordering applied to a filtered view. All orderings are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortKey {
    /// Newest first.
    #[default]
    #[serde(rename = "date-desc")]
    CreatedDesc,
    #[serde(rename = "date-asc")]
    CreatedAsc,
    /// High, then medium, then low.
    #[serde(rename = "priority")]
    Priority,
    /// Earliest deadline first.
    #[serde(rename = "deadline")]
    Deadline,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::CreatedDesc,
        SortKey::CreatedAsc,
        SortKey::Priority,
        SortKey::Deadline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::CreatedDesc => "date-desc",
            SortKey::CreatedAsc => "date-asc",
            SortKey::Priority => "priority",
            SortKey::Deadline => "deadline",
        }
    }
}

macro_rules! impl_view_keyword {
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

impl_view_keyword!(GoalFilter, "filter");
impl_view_keyword!(SortKey, "sort key");

/// Select the goals matching `filter`, preserving collection order.
pub fn filter_goals(goals: &[Goal], filter: GoalFilter, today: NaiveDate) -> Vec<&Goal> {
    goals.iter().filter(|g| filter.matches(g, today)).collect()
}

/// Stable in-place sort of a view.
pub fn sort_goals(view: &mut [&Goal], key: SortKey) {
    match key {
        SortKey::CreatedDesc => view.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::CreatedAsc => view.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortKey::Priority => view.sort_by_key(|g| g.priority.rank()),
        SortKey::Deadline => view.sort_by_key(|g| g.deadline),
    }
}
