//! Focus timer: a single countdown with save/restore and a completion log.
//!
//! The timer does not own a clock thread; whoever drives it calls `tick` once
//! per second.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use goaltrack_core::{Clock, SystemClock, UserId};

use crate::error::{ClientError, ClientResult};
use crate::store::KeyValueStore;

pub const TIMER_STATE_KEY: &str = "timerState";
pub const TIMER_SESSIONS_KEY: &str = "timerSessions";

/// Countdown length. Persisted as its length in minutes (`"25"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TimerPreset {
    #[default]
    Pomodoro,
    DeepWork,
    Extended,
}

impl TimerPreset {
    pub const ALL: [TimerPreset; 3] = [TimerPreset::Pomodoro, TimerPreset::DeepWork, TimerPreset::Extended];

    pub fn minutes(&self) -> u32 {
        match self {
            TimerPreset::Pomodoro => 25,
            TimerPreset::DeepWork => 50,
            TimerPreset::Extended => 90,
        }
    }

    pub fn seconds(&self) -> u32 {
        self.minutes() * 60
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TimerPreset::Pomodoro => "Pomodoro (25 min)",
            TimerPreset::DeepWork => "Deep Work (50 min)",
            TimerPreset::Extended => "Extended (90 min)",
        }
    }

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.minutes() == minutes)
    }
}

impl From<TimerPreset> for String {
    fn from(preset: TimerPreset) -> Self {
        preset.minutes().to_string()
    }
}

impl TryFrom<String> for TimerPreset {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .trim()
            .parse::<u32>()
            .ok()
            .and_then(TimerPreset::from_minutes)
            .ok_or_else(|| format!("unknown timer preset `{value}`"))
    }
}

impl core::str::FromStr for TimerPreset {
    type Err = String;

    /// Accepts minutes (`50`) or a name (`deep-work`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pomodoro" => Ok(TimerPreset::Pomodoro),
            "deep-work" | "deepwork" => Ok(TimerPreset::DeepWork),
            "extended" => Ok(TimerPreset::Extended),
            other => TimerPreset::try_from(other.to_string()),
        }
    }
}

/// Persisted timer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub seconds: u32,
    pub is_running: bool,
    pub session: TimerPreset,
}

impl Default for TimerState {
    fn default() -> Self {
        let session = TimerPreset::default();
        Self {
            seconds: session.seconds(),
            is_running: false,
            session,
        }
    }
}

/// One completed countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSession {
    pub date: DateTime<Utc>,
    /// Minutes.
    pub duration: u32,
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing changed.
    Idle,
    Running { remaining: u32 },
    /// Reached zero on this tick and stopped.
    Completed,
}

pub struct FocusTimer {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    state: TimerState,
    user_id: Option<UserId>,
}

impl FocusTimer {
    /// Load the persisted state, falling back to an idle Pomodoro.
    ///
    /// A timer that was running when saved is still running after restore.
    pub async fn restore(store: Arc<dyn KeyValueStore>) -> Self {
        let state = match store.get(TIMER_STATE_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                tracing::warn!("ignoring unreadable timer state: {err}");
                TimerState::default()
            }),
            Ok(None) => TimerState::default(),
            Err(err) => {
                tracing::warn!("failed to read timer state: {err:?}");
                TimerState::default()
            }
        };

        Self {
            store,
            clock: Arc::new(SystemClock),
            state,
            user_id: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Owner recorded on completed sessions.
    pub fn set_user(&mut self, user_id: Option<UserId>) {
        self.user_id = user_id;
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    /// Returns false (and changes nothing) while the timer is running.
    pub async fn select_preset(&mut self, preset: TimerPreset) -> ClientResult<bool> {
        if self.state.is_running {
            return Ok(false);
        }
        self.state.session = preset;
        self.state.seconds = preset.seconds();
        self.persist().await?;
        Ok(true)
    }

    pub async fn start(&mut self) -> ClientResult<()> {
        if self.state.is_running {
            return Ok(());
        }
        if self.state.seconds == 0 {
            self.state.seconds = self.state.session.seconds();
        }
        self.state.is_running = true;
        tracing::debug!(seconds = self.state.seconds, "timer started");
        self.persist().await
    }

    /// Stop and reload the selected preset.
    pub async fn reset(&mut self) -> ClientResult<()> {
        self.state.is_running = false;
        self.state.seconds = self.state.session.seconds();
        self.persist().await
    }

    /// Advance by one second.
    pub async fn tick(&mut self) -> ClientResult<TickOutcome> {
        if !self.state.is_running {
            return Ok(TickOutcome::Idle);
        }

        self.state.seconds = self.state.seconds.saturating_sub(1);
        if self.state.seconds > 0 {
            self.persist().await?;
            return Ok(TickOutcome::Running {
                remaining: self.state.seconds,
            });
        }

        self.state.is_running = false;
        self.persist().await?;
        self.log_session().await?;
        tracing::info!(minutes = self.state.session.minutes(), "focus session completed");
        Ok(TickOutcome::Completed)
    }

    /// `MM:SS`
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.state.seconds / 60, self.state.seconds % 60)
    }

    /// Completed sessions, oldest first.
    pub async fn sessions(&self) -> ClientResult<Vec<TimerSession>> {
        let raw = self
            .store
            .get(TIMER_SESSIONS_KEY)
            .await
            .map_err(ClientError::storage)?;

        match raw {
            Some(raw) => serde_json::from_str(&raw).map_err(ClientError::storage),
            None => Ok(Vec::new()),
        }
    }

    async fn log_session(&self) -> ClientResult<()> {
        let mut sessions = self.sessions().await.unwrap_or_else(|err| {
            tracing::warn!("discarding unreadable timer session log: {err}");
            Vec::new()
        });
        sessions.push(TimerSession {
            date: self.clock.now(),
            duration: self.state.session.minutes(),
            user_id: self.user_id.clone(),
        });

        let json = serde_json::to_string(&sessions).map_err(ClientError::storage)?;
        self.store
            .put(TIMER_SESSIONS_KEY, &json)
            .await
            .map_err(ClientError::storage)
    }

    async fn persist(&self) -> ClientResult<()> {
        let json = serde_json::to_string(&self.state).map_err(ClientError::storage)?;
        self.store
            .put(TIMER_STATE_KEY, &json)
            .await
            .map_err(ClientError::storage)
    }
}
