//! Engine configuration. TTL knobs can be overridden from the environment;
//! they affect only the eviction sweep, never scoring.

use serde::{Deserialize, Serialize};

pub const ENV_IDLE_TTL_HOURS: &str = "GUARDIAN_SESSION_TTL_HOURS";
pub const ENV_MAX_AGE_HOURS: &str = "GUARDIAN_SESSION_MAX_AGE_HOURS";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// HTTP surface
    pub server: ServerConfig,
    /// Session retention and sweep cadence
    pub session: SessionConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Evict a session idle longer than this
    pub idle_ttl_hours: i64,
    /// Evict a session older than this regardless of activity
    pub max_age_hours: i64,
    /// Sweep cadence
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl_hours: 24,
            max_age_hours: 48,
            sweep_interval_secs: 3600,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl EngineConfig {
    /// Load from JSON file if present; otherwise return default. Environment
    /// overrides apply either way.
    pub fn load(path: &std::path::Path) -> Self {
        let mut config = Self::default();
        if path.exists() {
            if let Ok(data) = std::fs::read_to_string(path) {
                if let Ok(c) = serde_json::from_str::<EngineConfig>(&data) {
                    config = c;
                }
            }
        }
        config.apply_env();
        config
    }

    /// Environment overrides for the TTL knobs; malformed values are ignored.
    pub fn apply_env(&mut self) {
        if let Some(hours) = env_hours(ENV_IDLE_TTL_HOURS) {
            self.session.idle_ttl_hours = hours;
        }
        if let Some(hours) = env_hours(ENV_MAX_AGE_HOURS) {
            self.session.max_age_hours = hours;
        }
    }
}

fn env_hours(var: &str) -> Option<i64> {
    std::env::var(var)
        .ok()?
        .trim()
        .parse()
        .ok()
        .filter(|h| *h >= 0)
}
