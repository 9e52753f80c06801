// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Restart policy configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ModelError, Result};
use crate::restart::{
    DEFAULT_IMMEDIATE_RESTARTS, DEFAULT_MAX_BACKOFF_DURATION, DEFAULT_MAX_RESTARTS,
    RestartCalculator,
};
use crate::validation::Validator;

pub const ENV_IMMEDIATE_RESTARTS: &str = "BBS_IMMEDIATE_RESTARTS";
pub const ENV_MAX_BACKOFF_DURATION_SECS: &str = "BBS_MAX_BACKOFF_DURATION_SECS";
pub const ENV_MAX_RESTARTS: &str = "BBS_MAX_RESTARTS";

/// Parameters for the crash restart calculator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartPolicyConfig {
    /// Crashes that restart with no delay (default: 3)
    pub immediate_restarts: i32,
    /// Ceiling on the wait between crash and restart (default: 16 minutes)
    pub max_backoff_duration: Duration,
    /// Crash count after which an instance is left crashed (default: 200)
    pub max_restarts: i32,
}

impl Default for RestartPolicyConfig {
    fn default() -> Self {
        Self {
            immediate_restarts: DEFAULT_IMMEDIATE_RESTARTS,
            max_backoff_duration: DEFAULT_MAX_BACKOFF_DURATION,
            max_restarts: DEFAULT_MAX_RESTARTS,
        }
    }
}

impl RestartPolicyConfig {
    /// Load configuration from environment variables.
    ///
    /// # Optional Environment Variables
    /// - `BBS_IMMEDIATE_RESTARTS` - Crashes restarted immediately (default: 3)
    /// - `BBS_MAX_BACKOFF_DURATION_SECS` - Backoff ceiling in seconds (default: 960)
    /// - `BBS_MAX_RESTARTS` - Restart cap (default: 200)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let immediate_restarts =
            parse_var(&lookup, ENV_IMMEDIATE_RESTARTS)?.unwrap_or(defaults.immediate_restarts);

        let max_backoff_duration = parse_var::<u64>(&lookup, ENV_MAX_BACKOFF_DURATION_SECS)?
            .map(Duration::from_secs)
            .unwrap_or(defaults.max_backoff_duration);

        let max_restarts = parse_var(&lookup, ENV_MAX_RESTARTS)?.unwrap_or(defaults.max_restarts);

        Ok(Self {
            immediate_restarts,
            max_backoff_duration,
            max_restarts,
        })
    }

    /// Set the number of immediate restarts.
    pub fn with_immediate_restarts(mut self, immediate_restarts: i32) -> Self {
        self.immediate_restarts = immediate_restarts;
        self
    }

    /// Set the backoff ceiling.
    pub fn with_max_backoff_duration(mut self, max_backoff_duration: Duration) -> Self {
        self.max_backoff_duration = max_backoff_duration;
        self
    }

    /// Set the restart cap.
    pub fn with_max_restarts(mut self, max_restarts: i32) -> Self {
        self.max_restarts = max_restarts;
        self
    }

    /// Construct and validate the calculator.
    pub fn build(&self) -> Result<RestartCalculator> {
        let calculator = RestartCalculator::new(
            self.immediate_restarts,
            self.max_backoff_duration,
            self.max_restarts,
        );
        calculator.validate()?;
        Ok(calculator)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ModelError::Config(format!("invalid {}: {}", name, e))),
    }
}
