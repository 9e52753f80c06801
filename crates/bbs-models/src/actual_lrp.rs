// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Actual LRPs: the observed state of one instance slot of a desired LRP.
//!
//! # State Machine
//!
//! ```text
//!            claim / start            start (cell that starts it wins)
//!  UNCLAIMED ─────────────▶ CLAIMED ─────────────▶ RUNNING
//!      ▲                      │  ▲                   │
//!      │                      │  └── same cell ──────┤
//!      │                      ▼                      ▼
//!      └──────── restart ─── CRASHED ◀── same cell ──┘
//! ```
//!
//! Any state may be released back to UNCLAIMED. Every other move that keeps
//! the instance claimed requires the same instance guid and cell, so two
//! cells can never race each other for one slot. CRASHED never moves to
//! CRASHED directly, which keeps a crash from being counted twice.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use crate::modification_tag::ModificationTag;
use crate::restart::RestartCalculator;
use crate::validation::{FieldError, ValidationError, Validator, is_valid_guid};

/// Lifecycle state of an actual LRP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ActualLrpState {
    Unclaimed,
    Claimed,
    Running,
    Crashed,
}

/// Identifies one instance slot of a desired process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActualLrpKey {
    pub process_guid: String,
    pub index: i32,
    pub domain: String,
}

impl ActualLrpKey {
    pub fn new(process_guid: impl Into<String>, index: i32, domain: impl Into<String>) -> Self {
        Self {
            process_guid: process_guid.into(),
            index,
            domain: domain.into(),
        }
    }
}

impl Validator for ActualLrpKey {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        if !is_valid_guid(&self.process_guid) {
            errors.append(FieldError::invalid_field("process_guid"));
        }
        if self.index < 0 {
            errors.append(FieldError::invalid_field("index"));
        }
        if self.domain.is_empty() {
            errors.append(FieldError::invalid_field("domain"));
        }

        errors.into_result()
    }
}

/// Identifies the running instance and the cell hosting it. Both halves are
/// empty while the slot is unclaimed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ActualLrpInstanceKey {
    pub instance_guid: String,
    pub cell_id: String,
}

impl ActualLrpInstanceKey {
    pub fn new(instance_guid: impl Into<String>, cell_id: impl Into<String>) -> Self {
        Self {
            instance_guid: instance_guid.into(),
            cell_id: cell_id.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.instance_guid.is_empty() && self.cell_id.is_empty()
    }
}

impl Validator for ActualLrpInstanceKey {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        if self.instance_guid.is_empty() {
            errors.append(FieldError::invalid_field("instance_guid"));
        }
        if self.cell_id.is_empty() {
            errors.append(FieldError::invalid_field("cell_id"));
        }

        errors.into_result()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortMapping {
    pub container_port: u32,
    pub host_port: u32,
}

/// Where a running instance can be reached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActualLrpNetInfo {
    pub address: String,
    pub ports: Vec<PortMapping>,
    pub instance_address: String,
}

impl ActualLrpNetInfo {
    pub fn new(address: impl Into<String>, ports: Vec<PortMapping>) -> Self {
        Self {
            address: address.into(),
            ports,
            instance_address: String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.address.is_empty() && self.ports.is_empty() && self.instance_address.is_empty()
    }
}

impl Validator for ActualLrpNetInfo {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        if self.address.is_empty() {
            errors.append(FieldError::invalid_field("address"));
        }
        errors.into_result()
    }
}

/// Observed state of one instance slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActualLrp {
    #[serde(flatten)]
    pub key: ActualLrpKey,
    #[serde(flatten)]
    pub instance_key: ActualLrpInstanceKey,
    #[serde(flatten)]
    pub net_info: ActualLrpNetInfo,
    #[serde(default)]
    pub crash_count: i32,
    #[serde(default)]
    pub crash_reason: String,
    pub state: ActualLrpState,
    #[serde(default)]
    pub placement_error: String,
    /// Unix nanoseconds at which the current state was entered
    pub since: i64,
    #[serde(default)]
    pub modification_tag: ModificationTag,
}

impl ActualLrp {
    /// A freshly created, unclaimed slot.
    pub fn new_unclaimed(key: ActualLrpKey, since: i64) -> Self {
        Self {
            key,
            instance_key: ActualLrpInstanceKey::default(),
            net_info: ActualLrpNetInfo::default(),
            crash_count: 0,
            crash_reason: String::new(),
            state: ActualLrpState::Unclaimed,
            placement_error: String::new(),
            since,
            modification_tag: ModificationTag::default(),
        }
    }

    /// Whether this record may be replaced by one with the given identity,
    /// ownership and state.
    pub fn allows_transition_to(
        &self,
        key: &ActualLrpKey,
        instance_key: &ActualLrpInstanceKey,
        new_state: ActualLrpState,
    ) -> bool {
        if self.key != *key {
            debug!(
                process_guid = %self.key.process_guid,
                index = self.key.index,
                "refusing transition that changes the actual LRP key"
            );
            return false;
        }

        let same_instance = self.instance_key == *instance_key;
        let newly_claimed = self.instance_key.is_empty() && !instance_key.is_empty();

        use ActualLrpState::*;
        let allowed = match (self.state, new_state) {
            (Unclaimed, Unclaimed) => true,
            (Unclaimed, Claimed | Running) => newly_claimed,
            (Unclaimed, Crashed) => false,

            (Claimed, Unclaimed) => true,
            (Claimed, Claimed) => same_instance,
            (Claimed, Running) => true,
            (Claimed, Crashed) => same_instance,

            (Running, Unclaimed) => true,
            (Running, Claimed | Running | Crashed) => same_instance,

            (Crashed, Unclaimed) => true,
            (Crashed, Claimed | Running) => same_instance,
            (Crashed, Crashed) => false,
        };

        if !allowed {
            debug!(
                process_guid = %self.key.process_guid,
                index = self.key.index,
                from = %self.state,
                to = %new_state,
                "refusing actual LRP transition"
            );
        }
        allowed
    }

    /// Whether a crashed instance may be restarted at `now` (unix nanoseconds).
    /// Always false outside CRASHED.
    pub fn should_restart_crash(&self, now: i64, calculator: &RestartCalculator) -> bool {
        self.state == ActualLrpState::Crashed
            && calculator.should_restart(now, self.since, self.crash_count)
    }

    /// Whether a crashed instance is still within its immediate restarts.
    pub fn should_restart_immediately(&self, calculator: &RestartCalculator) -> bool {
        self.state == ActualLrpState::Crashed && calculator.should_restart(0, 0, self.crash_count)
    }
}

impl Validator for ActualLrp {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        errors.check(self.key.validate());
        if self.since == 0 {
            errors.append(FieldError::invalid_field("since"));
        }

        let state = self.state;
        let forbid = |errors: &mut ValidationError, field: &str, present: bool| {
            if present {
                errors.append(FieldError::invalid(
                    field,
                    format!("cannot be set when state is {}", state),
                ));
            }
        };

        match state {
            ActualLrpState::Unclaimed => {
                forbid(&mut errors, "instance_key", !self.instance_key.is_empty());
                forbid(&mut errors, "net_info", !self.net_info.is_empty());
            }
            ActualLrpState::Claimed => {
                errors.check(self.instance_key.validate());
                forbid(&mut errors, "net_info", !self.net_info.is_empty());
                forbid(
                    &mut errors,
                    "placement_error",
                    !self.placement_error.trim().is_empty(),
                );
            }
            ActualLrpState::Running => {
                errors.check(self.instance_key.validate());
                errors.check(self.net_info.validate());
                forbid(
                    &mut errors,
                    "placement_error",
                    !self.placement_error.trim().is_empty(),
                );
            }
            ActualLrpState::Crashed => {
                forbid(&mut errors, "instance_key", !self.instance_key.is_empty());
                forbid(&mut errors, "net_info", !self.net_info.is_empty());
            }
        }

        if !errors.is_empty() {
            debug!(
                process_guid = %self.key.process_guid,
                state = %self.state,
                error_count = errors.len(),
                "actual LRP failed validation"
            );
        }
        errors.into_result()
    }
}
