//! Configuration types.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Backend the dashboard talks to when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str =
    "https://backend-prod-dot-pure-album-439502-s4.uc.r.appspot.com/api";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST base URL, without a trailing slash.
    pub api_base_url: String,
    /// User whose records are shown.
    pub user_id: i64,
    /// How many past chat turns to load on startup.
    pub conversation_limit: u32,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// WAV clip replayed by the file audio source.
    pub voice_clip_path: Option<PathBuf>,
    /// Directory for rolling log files (stderr only when unset).
    pub log_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            user_id: 1,
            conversation_limit: 20,
            request_timeout: Duration::from_secs(30),
            voice_clip_path: None,
            log_dir: None,
        }
    }
}

impl ClientConfig {
    /// Build config from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_base_url = lookup("MASTER_AGENT_API_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.api_base_url);

        let user_id = parse_var(&lookup, "MASTER_AGENT_USER_ID")?.unwrap_or(defaults.user_id);

        let conversation_limit = parse_var(&lookup, "MASTER_AGENT_CONVERSATION_LIMIT")?
            .unwrap_or(defaults.conversation_limit);

        let request_timeout = parse_var::<u64, _>(&lookup, "MASTER_AGENT_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let voice_clip_path = lookup("MASTER_AGENT_VOICE_FILE")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let log_dir = lookup("MASTER_AGENT_LOG_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            api_base_url,
            user_id,
            conversation_limit,
            request_timeout,
            voice_clip_path,
            log_dir,
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("{raw:?}: {e}"),
            }),
    }
}
