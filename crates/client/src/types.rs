//! Outcome and notification types shared by the synchronizer and its
//! observers (presentation layers never reach into synchronizer internals).

use serde::{Deserialize, Serialize};

use goaltrack_core::GoalId;
use goaltrack_goals::{Goal, GoalStats};

/// Where the current collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalSource {
    Remote,
    /// Last good snapshot (degraded mode).
    Cache,
}

/// Result of a successful `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOutcome {
    pub source: GoalSource,
    pub count: usize,
    /// Set when serving from cache.
    pub warning: Option<String>,
}

impl ListOutcome {
    pub fn is_degraded(&self) -> bool {
        self.source == GoalSource::Cache
    }
}

/// Counts for a best-effort batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BatchReport {
    pub attempted: usize,
    pub succeeded: usize,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }

    pub(crate) fn record(&mut self, ok: bool) {
        self.attempted += 1;
        if ok {
            self.succeeded += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchKind {
    ClearCompleted,
    Import,
}

/// Published by the synchronizer after every state change.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncNotice {
    GoalsLoaded { source: GoalSource, count: usize },
    DegradedMode { reason: String },
    GoalCreated(Goal),
    GoalUpdated(Goal),
    GoalDeleted(GoalId),
    ProgressChanged(GoalStats),
    BatchFinished { kind: BatchKind, report: BatchReport },
    /// Signed out; collection and cache were dropped.
    Cleared,
}
