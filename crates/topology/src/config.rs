//! Connector heartbeat configuration.
use std::path::Path;
use std::{fs, io};

use serde::{Deserialize, Serialize};
use serde_json as json;
use thiserror::Error;

/// Default time, in seconds, after which an announcement without heartbeat expires.
pub const DEFAULT_PING_TIMEOUT: u64 = 120;
/// Default time, in seconds, between two heartbeats.
pub const DEFAULT_PING_INTERVAL: u64 = 30;
/// Default maximum backoff, expressed in multiples of the ping interval.
pub const DEFAULT_BACKOFF_STABLE_FACTOR: u64 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("'{field}' must be greater than zero")]
    Zero { field: &'static str },
    #[error("ping interval ({interval}s) must be smaller than ping timeout ({timeout}s)")]
    IntervalTooLarge { interval: u64, timeout: u64 },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse configuration: {0}")]
    Json(#[from] json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
}

/// Heartbeat timing configuration.
///
/// All durations are in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Time after which an announcement that wasn't refreshed expires.
    pub connector_ping_timeout: u64,
    /// Expected time between two heartbeats of a connector.
    pub connector_ping_interval: u64,
    /// Upper bound of the backoff granted to stable connectors, in
    /// multiples of the ping interval.
    pub backoff_stable_factor: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connector_ping_timeout: DEFAULT_PING_TIMEOUT,
            connector_ping_interval: DEFAULT_PING_INTERVAL,
            backoff_stable_factor: DEFAULT_BACKOFF_STABLE_FACTOR,
        }
    }
}

impl Config {
    pub fn new(timeout: u64, interval: u64, backoff_stable_factor: u64) -> Self {
        Self {
            connector_ping_timeout: timeout,
            connector_ping_interval: interval,
            backoff_stable_factor,
        }
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let contents = fs::read_to_string(path)?;
        let config: Self = json::from_str(&contents)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connector_ping_timeout == 0 {
            return Err(ConfigError::Zero {
                field: "connectorPingTimeout",
            });
        }
        if self.connector_ping_interval == 0 {
            return Err(ConfigError::Zero {
                field: "connectorPingInterval",
            });
        }
        if self.connector_ping_interval >= self.connector_ping_timeout {
            return Err(ConfigError::IntervalTooLarge {
                interval: self.connector_ping_interval,
                timeout: self.connector_ping_timeout,
            });
        }
        Ok(())
    }

    /// Slack between the ping interval and the timeout.
    pub fn grace(&self) -> u64 {
        self.connector_ping_timeout
            .saturating_sub(self.connector_ping_interval)
    }
}
