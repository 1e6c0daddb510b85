// src/config.rs

use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "http://202.194.139.32/getfasta/index.html";
pub const DEFAULT_DATABASE: &str = "Chinese_Spring1.0.genome";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0";

/// Range offered for the pacing delay on the command line, in seconds.
pub const CLI_DELAY_RANGE: (f64, f64) = (0.5, 5.0);

/// Settings for one run. Every field has a default so a config file may be partial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub endpoint: String,
    pub database: String,
    pub user_agent: String,
    pub request_timeout_secs: f64,
    /// Total attempts per coordinate, first try included.
    pub max_attempts: u32,
    pub error_backoff_secs: f64,
    pub timeout_backoff_secs: f64,
    pub empty_backoff_secs: f64,
    pub pacing_delay_secs: f64,
    pub checkpoint_every: usize,
    pub max_rows: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 30.0,
            max_attempts: 3,
            error_backoff_secs: 2.0,
            timeout_backoff_secs: 5.0,
            empty_backoff_secs: 1.0,
            pacing_delay_secs: 1.0,
            checkpoint_every: 10,
            max_rows: None,
        }
    }
}

impl RunConfig {
    /// Reads a JSON config file; missing fields fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: RunConfig =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        info!("Loaded run configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(invalid("endpoint", "must not be empty"));
        }
        if self.database.trim().is_empty() {
            return Err(invalid("database", "must not be empty"));
        }
        if HeaderValue::from_str(&self.user_agent).is_err() {
            return Err(invalid("user_agent", "is not a valid HTTP header value"));
        }
        if self.max_attempts == 0 {
            return Err(invalid("max_attempts", "must be at least 1"));
        }
        if self.checkpoint_every == 0 {
            return Err(invalid("checkpoint_every", "must be at least 1"));
        }
        if self.max_rows == Some(0) {
            return Err(invalid("max_rows", "must be at least 1 when set"));
        }
        for (field, secs) in [
            ("request_timeout_secs", self.request_timeout_secs),
            ("error_backoff_secs", self.error_backoff_secs),
            ("timeout_backoff_secs", self.timeout_backoff_secs),
            ("empty_backoff_secs", self.empty_backoff_secs),
            ("pacing_delay_secs", self.pacing_delay_secs),
        ] {
            check_secs(field, secs)?;
        }
        if self.request_timeout_secs == 0.0 {
            return Err(invalid("request_timeout_secs", "must be positive"));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            error_backoff: Duration::from_secs_f64(self.error_backoff_secs),
            timeout_backoff: Duration::from_secs_f64(self.timeout_backoff_secs),
            empty_backoff: Duration::from_secs_f64(self.empty_backoff_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout_secs)
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_secs_f64(self.pacing_delay_secs)
    }
}

/// Clamp a command-line delay into the supported range.
pub fn clamp_cli_delay(secs: f64) -> f64 {
    if secs.is_nan() {
        return CLI_DELAY_RANGE.0;
    }
    secs.clamp(CLI_DELAY_RANGE.0, CLI_DELAY_RANGE.1)
}

/// Retry budget and sleeps between attempts of one lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub error_backoff: Duration,
    pub timeout_backoff: Duration,
    pub empty_backoff: Duration,
}

impl RetryPolicy {
    /// Same budget, no sleeping.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            error_backoff: Duration::ZERO,
            timeout_backoff: Duration::ZERO,
            empty_backoff: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RunConfig::default().retry_policy()
    }
}

fn check_secs(field: &'static str, secs: f64) -> Result<(), ConfigError> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(invalid(field, &format!("{secs} is not a non-negative number of seconds")));
    }
    Ok(())
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}
