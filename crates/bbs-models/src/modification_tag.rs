// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Optimistic-concurrency tags carried by stored records.

use serde::{Deserialize, Serialize};

/// Version stamp: `epoch` changes when a record is recreated, `index` on
/// every update within an epoch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationTag {
    #[serde(default)]
    pub epoch: String,
    #[serde(default)]
    pub index: u32,
}

impl ModificationTag {
    pub fn new(epoch: impl Into<String>, index: u32) -> Self {
        Self {
            epoch: epoch.into(),
            index,
        }
    }

    /// Bump the index; it rolls over to 0 after `u32::MAX`.
    pub fn increment(&mut self) {
        self.index = self.index.wrapping_add(1);
    }

    /// True if `other` is a later version of the same record. A tag without
    /// an epoch is always succeeded.
    pub fn succeeded_by(&self, other: &ModificationTag) -> bool {
        if self.epoch.is_empty() || other.epoch.is_empty() {
            return true;
        }
        self.epoch != other.epoch || self.index < other.index
    }
}
