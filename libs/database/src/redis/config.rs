#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_first};

/// URL used when no Redis variable is set.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Redis connection settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedisConfig {
    /// `redis://[user:pass@]host[:port][/db]`
    pub url: String,
}

impl RedisConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REDIS_URL)
    }
}

/// Reads `REDIS_URL`, then `REDIS_HOST`, defaulting to [`DEFAULT_REDIS_URL`].
#[cfg(feature = "config")]
impl FromEnv for RedisConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(env_first(&["REDIS_URL", "REDIS_HOST"])
            .map(Self::new)
            .unwrap_or_default())
    }
}
