//! `goaltrack-client`
//!
//! **Responsibility:** keep the signed-in user's goals in sync with the
//! remote goal store.
//!
//! This crate provides:
//! - The goal synchronizer (create/update/delete/list against the remote store)
//! - A local snapshot cache used as a read fallback (degraded mode)
//! - Remote store adapters (HTTP and in-memory)
//! - Focus timer and form-draft persistence
//!
//! The remote store stays the authority: writes are never applied locally
//! before the store accepts them.

pub mod cache;
pub mod config;
pub mod draft;
pub mod error;
pub mod offline;
pub mod remote;
pub mod store;
pub mod sync;
pub mod timer;
pub mod types;

pub use cache::{GOALS_CACHE_KEY, GoalSnapshot, LocalCache, SNAPSHOT_SCHEMA_VERSION};
pub use config::{ClientConfig, SessionSeed};
pub use draft::{DRAFT_KEY, DraftStore};
pub use error::{ClientError, ClientResult};
pub use offline::{ConnectivityState, OfflineMode};
pub use remote::{FieldUpdate, HttpGoalStore, InMemoryGoalStore, RemoteError, RemoteGoalStore};
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
pub use sync::{GoalState, GoalSynchronizer};
pub use timer::{FocusTimer, TickOutcome, TimerPreset, TimerSession, TimerState};
pub use types::{BatchKind, BatchReport, GoalSource, ListOutcome, SyncNotice};
