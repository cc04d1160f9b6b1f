//! `goaltrack-core` - foundation building blocks.
//!
//! This crate contains **pure** primitives shared by every other crate
//! (no IO, no HTTP, no storage).

pub mod bus;
pub mod error;
pub mod id;
pub mod time;

pub use bus::{Notifier, Subscription};
pub use error::{DomainError, DomainResult};
pub use id::{GoalId, UserId};
pub use time::{Clock, FixedClock, SystemClock};
