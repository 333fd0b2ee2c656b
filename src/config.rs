//! Runtime configuration
//!
//! Every field has a default; the CLI overrides them from flags or
//! `JOKELIST_*` environment variables.

use crate::refill::RefillPolicy;
use crate::source::DEFAULT_ENDPOINT;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Jokes per refill unless configured otherwise
pub const DEFAULT_NUM_JOKES: usize = 5;

/// Consecutive duplicates tolerated before a refill gives up
pub const DEFAULT_MAX_DUPLICATE_STREAK: usize = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("number of jokes must be at least 1")]
    ZeroJokes,
    #[error("request timeout must be non-zero")]
    ZeroTimeout,
    #[error("endpoint must be an http(s) URL, got '{0}'")]
    BadEndpoint(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// SQLite database holding the persisted session
    pub db_path: PathBuf,
    /// Joke endpoint queried once per fetch
    pub endpoint: String,
    /// Target collection size for a refill
    pub num_jokes: usize,
    pub request_timeout: Duration,
    /// `None` retries duplicates forever
    pub max_duplicate_streak: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            num_jokes: DEFAULT_NUM_JOKES,
            request_timeout: Duration::from_secs(10),
            max_duplicate_streak: Some(DEFAULT_MAX_DUPLICATE_STREAK),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_jokes == 0 {
            return Err(ConfigError::ZeroJokes);
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(ConfigError::BadEndpoint(self.endpoint.clone()));
        }
        Ok(())
    }

    pub fn refill_policy(&self) -> RefillPolicy {
        RefillPolicy {
            max_duplicate_streak: self.max_duplicate_streak,
        }
    }
}

/// Get the default database path (~/.local/share/jokelist/jokelist.db)
pub fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("jokelist").join("jokelist.db")
}
