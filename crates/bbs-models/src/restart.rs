// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Crash-backoff restart policy for actual LRPs.
//!
//! The first `immediate_restarts` crashes restart with no delay. After that
//! the wait doubles from [`CRASH_BACKOFF_MIN_DURATION`] on every crash until it
//! reaches `max_backoff_duration`. Once the crash count hits `max_restarts`
//! the instance is never restarted again.
//!
//! With the defaults:
//!
//! | Crash count | Wait |
//! |-------------|------|
//! | 0..=2 | none |
//! | 3 | 30s |
//! | 4 | 1m |
//! | 5 | 2m |
//! | 6 | 4m |
//! | 7 | 8m |
//! | 8..=199 | 16m |
//! | 200+ | never |

use std::time::Duration;

use tracing::trace;

use crate::validation::{FieldError, ValidationError, Validator};

/// Crashes that restart with no backoff.
pub const DEFAULT_IMMEDIATE_RESTARTS: i32 = 3;

/// Longest wait between a crash and its restart.
pub const DEFAULT_MAX_BACKOFF_DURATION: Duration = Duration::from_secs(16 * 60);

/// Crash count after which an instance stays crashed.
pub const DEFAULT_MAX_RESTARTS: i32 = 200;

/// Backoff unit; the first delayed restart waits this long.
pub const CRASH_BACKOFF_MIN_DURATION: Duration = Duration::from_secs(30);

/// Decides when a crashed instance may be restarted. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartCalculator {
    immediate_restarts: i32,
    /// Doubling steps from the minimum backoff needed to reach the maximum;
    /// derived at construction.
    max_backoff_count: i32,
    max_backoff_duration: Duration,
    max_restarts: i32,
}

impl RestartCalculator {
    pub fn new(immediate_restarts: i32, max_backoff_duration: Duration, max_restarts: i32) -> Self {
        Self {
            immediate_restarts,
            max_backoff_count: calculate_max_backoff_count(max_backoff_duration),
            max_backoff_duration,
            max_restarts,
        }
    }

    pub fn immediate_restarts(&self) -> i32 {
        self.immediate_restarts
    }

    pub fn max_backoff_count(&self) -> i32 {
        self.max_backoff_count
    }

    pub fn max_backoff_duration(&self) -> Duration {
        self.max_backoff_duration
    }

    pub fn max_restarts(&self) -> i32 {
        self.max_restarts
    }

    /// The wait before crash number `crash_count` may restart, or `None`
    /// if it may never restart.
    pub fn backoff_for(&self, crash_count: i32) -> Option<Duration> {
        if crash_count >= self.max_restarts {
            return None;
        }
        if crash_count < self.immediate_restarts {
            return Some(Duration::ZERO);
        }

        let exponent = crash_count
            .saturating_sub(self.immediate_restarts)
            .min(self.max_backoff_count)
            .max(0);
        Some(exponential_backoff(exponent as u32).min(self.max_backoff_duration))
    }

    /// Whether an instance that crashed at `crashed_at` (unix nanoseconds)
    /// for the `crash_count`-th time may restart at `now`.
    pub fn should_restart(&self, now: i64, crashed_at: i64, crash_count: i32) -> bool {
        let Some(backoff) = self.backoff_for(crash_count) else {
            trace!(crash_count, max_restarts = self.max_restarts, "restart limit reached");
            return false;
        };

        let backoff_ns = i64::try_from(backoff.as_nanos()).unwrap_or(i64::MAX);
        let elapsed_ns = now.saturating_sub(crashed_at);
        let restart = elapsed_ns >= backoff_ns;
        trace!(
            crash_count,
            backoff_ms = backoff.as_millis() as u64,
            elapsed_ns,
            restart,
            "evaluated crash backoff"
        );
        restart
    }
}

impl Default for RestartCalculator {
    fn default() -> Self {
        Self::new(
            DEFAULT_IMMEDIATE_RESTARTS,
            DEFAULT_MAX_BACKOFF_DURATION,
            DEFAULT_MAX_RESTARTS,
        )
    }
}

impl Validator for RestartCalculator {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        if self.max_backoff_duration < CRASH_BACKOFF_MIN_DURATION {
            errors.append(FieldError::invalid(
                "max_backoff_duration",
                format!(
                    "{:?} must be at least the minimum crash backoff of {:?}",
                    self.max_backoff_duration, CRASH_BACKOFF_MIN_DURATION
                ),
            ));
        }
        errors.into_result()
    }
}

/// `floor(log2(ceil(max / min)))`, never negative.
fn calculate_max_backoff_count(max_backoff_duration: Duration) -> i32 {
    let steps = max_backoff_duration
        .as_nanos()
        .div_ceil(CRASH_BACKOFF_MIN_DURATION.as_nanos());
    if steps == 0 {
        return 0;
    }
    steps.ilog2() as i32
}

fn exponential_backoff(exponent: u32) -> Duration {
    let factor = 1u32.checked_shl(exponent).unwrap_or(u32::MAX);
    CRASH_BACKOFF_MIN_DURATION.saturating_mul(factor)
}
