use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::retry::RetryPolicy;

pub const DEFAULT_ROOT_URL: &str = "http://www.ctabustracker.com/bustime/api";
pub const DEFAULT_API_VERSION: &str = "v1";

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub api_key: String,
    pub retry_enabled: bool,
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_multiplier: f64,
    pub timeout: Duration,
    pub root_url: String,
    pub api_version: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            retry_enabled: true,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_RETRY_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            timeout: DEFAULT_TIMEOUT,
            root_url: DEFAULT_ROOT_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Reads `BUSTRACKER_*` variables, loading a `.env` file first if present.
    ///
    /// Only the API key is mandatory; anything unset or unparseable keeps its default.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let api_key = env::var("BUSTRACKER_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Config("BUSTRACKER_API_KEY is not set".to_string()))?;

        Ok(Self::from_env_with_api_key(api_key))
    }

    /// Same as [`ClientConfig::from_env`] with the API key supplied by the caller.
    pub fn from_env_with_api_key(api_key: impl Into<String>) -> Self {
        dotenv().ok();

        let retry_enabled = env::var("BUSTRACKER_RETRY_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);
        let max_attempts = env::var("BUSTRACKER_MAX_ATTEMPTS")
            .unwrap_or_else(|_| DEFAULT_MAX_ATTEMPTS.to_string())
            .parse()
            .unwrap_or(DEFAULT_MAX_ATTEMPTS);
        let initial_delay = env::var("BUSTRACKER_RETRY_DELAY_MS")
            .ok()
            .and_then(|ms| ms.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_RETRY_DELAY);
        let backoff_multiplier = env::var("BUSTRACKER_RETRY_BACKOFF")
            .unwrap_or_else(|_| DEFAULT_BACKOFF_MULTIPLIER.to_string())
            .parse()
            .unwrap_or(DEFAULT_BACKOFF_MULTIPLIER);
        let timeout = env::var("BUSTRACKER_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        let root_url =
            env::var("BUSTRACKER_ROOT_URL").unwrap_or_else(|_| DEFAULT_ROOT_URL.to_string());
        let api_version =
            env::var("BUSTRACKER_API_VERSION").unwrap_or_else(|_| DEFAULT_API_VERSION.to_string());

        Self {
            api_key: api_key.into(),
            retry_enabled,
            max_attempts: max_attempts.max(1),
            initial_delay,
            backoff_multiplier,
            timeout,
            root_url,
            api_version,
        }
    }

    pub fn with_retry_enabled(mut self, enabled: bool) -> Self {
        self.retry_enabled = enabled;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_root_url(mut self, root_url: impl Into<String>) -> Self {
        self.root_url = root_url.into();
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        if self.retry_enabled {
            RetryPolicy::new(self.max_attempts, self.initial_delay, self.backoff_multiplier)
        } else {
            RetryPolicy::disabled()
        }
    }
}
