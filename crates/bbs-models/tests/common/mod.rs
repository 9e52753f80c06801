// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Shared helpers for bbs-models integration tests.

#![allow(dead_code)]

use bbs_models::{ActualLrpInstanceKey, ActualLrpKey};

/// Route library events to the test writer. Set `RUST_LOG=bbs_models=debug`
/// to see validation and transition refusals.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub fn lrp_key() -> ActualLrpKey {
    ActualLrpKey::new("process-guid", 1, "cf-apps")
}

pub fn instance_key(cell: &str) -> ActualLrpInstanceKey {
    ActualLrpInstanceKey::new(format!("instance-{}", cell), cell)
}

pub const SECOND: i64 = 1_000_000_000;
