use serde::{Deserialize, Serialize};

pub const TIMEOUT_ENV: &str = "INCIDENT_WATCH_TIMEOUT_SECS";
pub const USER_AGENT_ENV: &str = "INCIDENT_WATCH_USER_AGENT";

const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchConfig {
    /// Per-request timeout; a hung feed otherwise stalls the whole run.
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a whole number of seconds, got `{value}`")]
    InvalidTimeout { name: &'static str, value: String },
    #[error("timeout_secs must be greater than 0")]
    ZeroTimeout,
    #[error("user_agent is required")]
    EmptyUserAgent,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("incident-watch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl WatchConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `lookup`, falling back to defaults for unset
    /// or blank keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(TIMEOUT_ENV).filter(|value| !value.trim().is_empty()) {
            config.timeout_secs = raw.trim().parse().map_err(|_| ConfigError::InvalidTimeout {
                name: TIMEOUT_ENV,
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = lookup(USER_AGENT_ENV).filter(|value| !value.trim().is_empty()) {
            config.user_agent = raw.trim().to_string();
        }
        Ok(config)
    }

    pub fn with_overrides(mut self, timeout_secs: Option<u64>, user_agent: Option<String>) -> Self {
        if let Some(timeout_secs) = timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        if let Some(user_agent) = user_agent {
            self.user_agent = user_agent;
        }
        self
    }
}

pub fn validate_config(config: &WatchConfig) -> Result<(), ConfigError> {
    if config.timeout_secs == 0 {
        return Err(ConfigError::ZeroTimeout);
    }
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::EmptyUserAgent);
    }
    Ok(())
}
