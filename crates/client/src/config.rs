//! Client configuration from the environment.

use std::path::PathBuf;
use std::time::Duration;

use goaltrack_auth::SessionUser;
use goaltrack_core::UserId;
use goaltrack_observability::LogFormat;

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

const STORE_FILE: &str = "goaltrack.db";

/// Credentials handed over by the account service (or the environment).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSeed {
    pub user: SessionUser,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub data_dir: PathBuf,
    pub http_timeout: Duration,
    pub log_format: LogFormat,
    pub session: Option<SessionSeed>,
}

impl ClientConfig {
    /// Read `GOALTRACK_*` variables from the process environment.
    pub fn from_env() -> ClientResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, with variables supplied by `lookup`.
    pub fn from_lookup<F>(lookup: F) -> ClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_url = var("GOALTRACK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let data_dir = var("GOALTRACK_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let http_timeout = match var("GOALTRACK_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map(Duration::from_secs).map_err(|_| {
                ClientError::Validation(format!("GOALTRACK_HTTP_TIMEOUT_SECS must be a number of seconds, got `{raw}`"))
            })?,
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let log_format = match var("GOALTRACK_LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().map_err(ClientError::Validation)?,
            None => LogFormat::default(),
        };

        let session = match (var("GOALTRACK_TOKEN"), var("GOALTRACK_USER_ID")) {
            (Some(token), Some(user_id)) => Some(SessionSeed {
                user: SessionUser {
                    id: UserId::parse(user_id)?,
                    email: var("GOALTRACK_USER_EMAIL").unwrap_or_default(),
                },
                token,
            }),
            (None, None) => None,
            _ => {
                return Err(ClientError::Validation(
                    "GOALTRACK_TOKEN and GOALTRACK_USER_ID must be set together".to_string(),
                ));
            }
        };

        Ok(Self {
            api_url,
            data_dir,
            http_timeout,
            log_format,
            session,
        })
    }

    /// SQLite file backing the local key-value store.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("goaltrack")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> ClientResult<ClientConfig> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config(&[]).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.session, None);
        assert!(config.store_path().ends_with("goaltrack/goaltrack.db"));
    }

    #[test]
    fn overrides_are_read() {
        let config = config(&[
            ("GOALTRACK_API_URL", "https://goals.example.com/api"),
            ("GOALTRACK_DATA_DIR", "/tmp/gt"),
            ("GOALTRACK_HTTP_TIMEOUT_SECS", "5"),
            ("GOALTRACK_LOG_FORMAT", "json"),
            ("GOALTRACK_TOKEN", "tok"),
            ("GOALTRACK_USER_ID", "u1"),
            ("GOALTRACK_USER_EMAIL", "me@example.com"),
        ])
        .unwrap();

        assert_eq!(config.api_url, "https://goals.example.com/api");
        assert_eq!(config.store_path(), PathBuf::from("/tmp/gt/goaltrack.db"));
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.log_format, LogFormat::Json);

        let seed = config.session.unwrap();
        assert_eq!(seed.token, "tok");
        assert_eq!(seed.user.email, "me@example.com");
    }

    #[test]
    fn half_a_session_is_rejected() {
        assert!(matches!(config(&[("GOALTRACK_TOKEN", "tok")]), Err(ClientError::Validation(_))));
        assert!(matches!(
            config(&[("GOALTRACK_HTTP_TIMEOUT_SECS", "soon")]),
            Err(ClientError::Validation(_))
        ));
    }
}
