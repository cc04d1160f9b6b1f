//! Connectivity tracking.

use serde::{Deserialize, Serialize};

/// Connectivity state of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityState {
    /// The remote store answered the last call.
    Online,
    /// The remote store was unreachable on the last call.
    Offline,
}

/// Last-observed reachability of the remote store.
///
/// This is bookkeeping only: writes are still attempted while offline, and
/// their failure is what keeps the state offline.
#[derive(Debug)]
pub struct OfflineMode {
    state: ConnectivityState,
    last_error: Option<String>,
}

impl OfflineMode {
    pub fn new() -> Self {
        Self {
            state: ConnectivityState::Online,
            last_error: None,
        }
    }

    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    /// Why the client went offline, if it is.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Mark the client as offline.
    pub fn set_offline(&mut self, reason: impl Into<String>) {
        if self.state == ConnectivityState::Online {
            tracing::warn!("remote goal store unreachable; entering offline mode");
        }
        self.state = ConnectivityState::Offline;
        self.last_error = Some(reason.into());
    }

    /// Mark the client as online.
    pub fn set_online(&mut self) {
        if self.state == ConnectivityState::Offline {
            tracing::info!("remote goal store reachable again");
        }
        self.state = ConnectivityState::Online;
        self.last_error = None;
    }

    pub fn is_offline(&self) -> bool {
        self.state == ConnectivityState::Offline
    }
}

impl Default for OfflineMode {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_keep_the_last_reason() {
        let mut mode = OfflineMode::new();
        assert_eq!(mode.state(), ConnectivityState::Online);

        mode.set_offline("connection refused");
        assert!(mode.is_offline());
        assert_eq!(mode.last_error(), Some("connection refused"));

        mode.set_online();
        assert!(!mode.is_offline());
        assert_eq!(mode.last_error(), None);
    }
}
