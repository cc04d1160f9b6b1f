//! Completion statistics derived from a goal collection.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::goal::{Category, Goal};

/// Per-category progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CategoryProgress {
    pub completed: usize,
    pub total: usize,
}

impl CategoryProgress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GoalStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
    /// `round(completed / total * 100)`, 0 for an empty collection.
    pub completion_rate: u32,
    /// Only categories that have at least one goal appear.
    pub by_category: BTreeMap<Category, CategoryProgress>,
}

impl GoalStats {
    pub fn compute(goals: &[Goal], now: DateTime<Utc>) -> Self {
        let mut stats = GoalStats {
            total: goals.len(),
            ..GoalStats::default()
        };

        for goal in goals {
            let entry = stats.by_category.entry(goal.category).or_default();
            entry.total += 1;

            if goal.completed {
                stats.completed += 1;
                entry.completed += 1;
            } else if goal.is_overdue(now) {
                stats.overdue += 1;
            }
        }

        stats.pending = stats.total - stats.completed;
        stats.completion_rate = completion_rate(stats.completed, stats.total);
        stats
    }
}

fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (completed as f64 / total as f64 * 100.0).round() as u32
}
