//! Goals domain module.
//!
//! Business rules for personal goals, implemented purely as deterministic
//! domain logic (no IO, no HTTP, no storage): the record model, draft
//! validation, filter/sort policy, statistics and the export/import documents.

pub mod goal;
pub mod stats;
pub mod transfer;
pub mod view;

pub use goal::{Category, Goal, GoalDraft, GoalPatch, NewGoal, Priority, Reminder};
pub use stats::{CategoryProgress, GoalStats};
pub use transfer::{EXPORT_FORMAT_VERSION, ExportDocument, ExportStats, ImportDocument, export_file_name};
pub use view::{GoalFilter, SortKey, filter_goals, sort_goals};
