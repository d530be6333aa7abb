//! Command-line interface parsing for the India weather CLI
//!
//! Every flag is optional; with none given the tool prompts for the API key
//! and uses the public OpenWeatherMap endpoint, a 5 minute cache and a 10
//! second request timeout.

use std::time::Duration as StdDuration;

use chrono::Duration;
use clap::Parser;
use thiserror::Error;

use crate::cache::DEFAULT_EXPIRY_MINUTES;
use crate::data::weather::{DEFAULT_TIMEOUT_SECS, OPENWEATHER_BASE_URL};

/// Error types for CLI argument validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    /// Cache expiry must be at least one minute
    #[error("Invalid cache expiry: {0} minutes. Must be at least 1 and within range")]
    InvalidCacheExpiry(i64),

    /// Request timeout must be at least one second
    #[error("Invalid timeout: {0} seconds. Must be at least 1")]
    InvalidTimeout(u64),
}

/// India Weather CLI - current weather and tomorrow's forecast for Indian cities and pincodes
#[derive(Parser, Debug)]
#[command(name = "indweather")]
#[command(about = "Current weather and tomorrow's forecast for Indian cities and pincodes")]
#[command(version)]
pub struct Cli {
    /// OpenWeatherMap API key; prompted for when omitted
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the weather API
    #[arg(long, value_name = "URL", default_value = OPENWEATHER_BASE_URL)]
    pub base_url: String,

    /// Minutes a fetched location stays cached
    #[arg(long, value_name = "MINUTES", default_value_t = DEFAULT_EXPIRY_MINUTES)]
    pub cache_minutes: i64,

    /// Seconds to wait for each API request
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// API key supplied up front, if any
    pub api_key: Option<String>,
    /// Base URL of the weather API
    pub base_url: String,
    /// Lifetime of a cached snapshot
    pub cache_expiry: Duration,
    /// Per-request timeout
    pub timeout: StdDuration,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: OPENWEATHER_BASE_URL.to_string(),
            cache_expiry: Duration::minutes(DEFAULT_EXPIRY_MINUTES),
            timeout: StdDuration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with validated settings
    /// * `Err(CliError)` if the cache expiry or timeout is out of range
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let cache_expiry = Duration::try_minutes(cli.cache_minutes)
            .filter(|_| cli.cache_minutes >= 1)
            .ok_or(CliError::InvalidCacheExpiry(cli.cache_minutes))?;

        if cli.timeout_secs < 1 {
            return Err(CliError::InvalidTimeout(cli.timeout_secs));
        }

        // A blank key from the environment is treated as absent so the user is prompted
        let api_key = cli
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        Ok(StartupConfig {
            api_key,
            base_url: cli.base_url.clone(),
            cache_expiry,
            timeout: StdDuration::from_secs(cli.timeout_secs),
        })
    }
}
