// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Concrete action variants.
//!
//! Leaf steps ([`DownloadAction`], [`UploadAction`], [`RunAction`]) carry the
//! work itself. Unary wrappers ([`TimeoutAction`], [`TryAction`],
//! [`EmitProgressAction`]) hold exactly one child; n-ary combinators
//! ([`ParallelAction`], [`SerialAction`], [`CodependentAction`]) hold a list.
//!
//! Child slots are optional on purpose: a definition arriving over the wire
//! may omit them, and validation reports the gap instead of the decoder.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::Action;
use crate::environment::EnvironmentVariable;

// ============================================================================
// Leaf Actions
// ============================================================================

/// Fetch an artifact into the container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadAction {
    /// Human-readable artifact name for progress messages
    pub artifact: String,
    /// Source URL
    pub from: String,
    /// Destination path inside the container
    pub to: String,
    /// Key under which the executor caches the download; empty disables caching
    pub cache_key: String,
    pub log_source: String,
    pub user: String,
    pub checksum_algorithm: String,
    pub checksum_value: String,
}

impl DownloadAction {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            ..Default::default()
        }
    }
}

/// Stream a file out of the container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadAction {
    pub artifact: String,
    /// Path inside the container
    pub from: String,
    /// Destination URL
    pub to: String,
    pub log_source: String,
    pub user: String,
}

impl UploadAction {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            ..Default::default()
        }
    }
}

/// Per-process resource limits for a [`RunAction`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nofile: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nproc: Option<u64>,
}

/// Run a process inside the container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunAction {
    pub path: String,
    pub args: Vec<String>,
    /// Working directory
    pub dir: String,
    pub env: Vec<EnvironmentVariable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_limits: Option<ResourceLimits>,
    pub user: String,
    pub log_source: String,
    pub suppress_log_output: bool,
}

impl RunAction {
    pub fn new(path: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            user: user.into(),
            ..Default::default()
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, env: Vec<EnvironmentVariable>) -> Self {
        self.env = env;
        self
    }
}

// ============================================================================
// Unary Wrappers
// ============================================================================

/// Fail the wrapped action if it has not finished within `timeout_ns`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutAction {
    pub action: Option<Box<Action>>,
    /// Deadline in nanoseconds; must be strictly positive
    #[serde(rename = "timeout")]
    pub timeout_ns: i64,
    pub log_source: String,
}

impl TimeoutAction {
    pub fn new(action: impl Into<Action>, timeout: Duration) -> Self {
        Self {
            action: Some(Box::new(action.into())),
            timeout_ns: i64::try_from(timeout.as_nanos()).unwrap_or(i64::MAX),
            log_source: String::new(),
        }
    }

    /// The deadline as a `Duration`, or `None` if it is not positive.
    pub fn timeout(&self) -> Option<Duration> {
        u64::try_from(self.timeout_ns)
            .ok()
            .filter(|ns| *ns > 0)
            .map(Duration::from_nanos)
    }
}

/// Run the wrapped action and swallow its failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TryAction {
    pub action: Option<Box<Action>>,
    pub log_source: String,
}

impl TryAction {
    pub fn new(action: impl Into<Action>) -> Self {
        Self {
            action: Some(Box::new(action.into())),
            log_source: String::new(),
        }
    }
}

/// Log progress messages around the wrapped action.
///
/// Each message is optional; an absent message is not emitted, which is
/// different from emitting an empty line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitProgressAction {
    pub action: Option<Box<Action>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_message_prefix: Option<String>,
    pub log_source: String,
}

impl EmitProgressAction {
    pub fn new(
        action: impl Into<Action>,
        start_message: impl Into<String>,
        success_message: impl Into<String>,
        failure_message_prefix: impl Into<String>,
    ) -> Self {
        Self {
            action: Some(Box::new(action.into())),
            start_message: Some(start_message.into()),
            success_message: Some(success_message.into()),
            failure_message_prefix: Some(failure_message_prefix.into()),
            log_source: String::new(),
        }
    }
}

// ============================================================================
// N-ary Combinators
// ============================================================================

/// Run all children concurrently; fails if any child fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelAction {
    pub actions: Option<Vec<Option<Action>>>,
    pub log_source: String,
}

/// Run children one after another, stopping at the first failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialAction {
    pub actions: Option<Vec<Option<Action>>>,
    pub log_source: String,
}

/// Run all children concurrently; the first to exit, for any reason, stops
/// the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodependentAction {
    pub actions: Option<Vec<Option<Action>>>,
    pub log_source: String,
}

macro_rules! impl_combinator_constructors {
    ($($combinator:ident),+ $(,)?) => {
        $(
            impl $combinator {
                pub fn new<I>(actions: I) -> Self
                where
                    I: IntoIterator,
                    I::Item: Into<Action>,
                {
                    Self {
                        actions: Some(actions.into_iter().map(|a| Some(a.into())).collect()),
                        log_source: String::new(),
                    }
                }

                /// Build from raw slots, keeping empty ones in place.
                pub fn from_slots(slots: Vec<Option<Action>>) -> Self {
                    Self {
                        actions: Some(slots),
                        log_source: String::new(),
                    }
                }

                /// Iterate over the populated children.
                pub fn children(&self) -> impl Iterator<Item = &Action> {
                    self.actions.iter().flatten().flatten()
                }
            }
        )+
    };
}

impl_combinator_constructors!(ParallelAction, SerialAction, CodependentAction);
