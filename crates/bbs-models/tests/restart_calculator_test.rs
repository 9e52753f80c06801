// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Restart calculator tests through the public configuration surface.

mod common;

use std::time::Duration;

use bbs_models::restart::{CRASH_BACKOFF_MIN_DURATION, DEFAULT_MAX_BACKOFF_DURATION};
use bbs_models::{ActualLrp, ActualLrpState, RestartCalculator, RestartPolicyConfig, Validator};
use common::{SECOND, init_tracing, lrp_key};

fn calculator_119s() -> RestartCalculator {
    RestartPolicyConfig::default()
        .with_immediate_restarts(3)
        .with_max_backoff_duration(Duration::from_secs(119))
        .with_max_restarts(200)
        .build()
        .unwrap()
}

#[test]
fn test_restart_boundaries() {
    init_tracing();
    let calc = calculator_119s();

    // (now, crash count, expected)
    let cases = [
        (0, 0, true),
        (0, 1, true),
        (0, 2, true),
        (0, 3, false),
        (30 * SECOND, 3, true),
        (59 * SECOND, 4, false),
        (60 * SECOND, 4, true),
        (118 * SECOND, 5, false),
        (119 * SECOND, 5, true),
        (0, 200, false),
        (1_000_000 * SECOND, 200, false),
    ];

    for (now, crash_count, expected) in cases {
        assert_eq!(
            calc.should_restart(now, 0, crash_count),
            expected,
            "now={}s crash_count={}",
            now / SECOND,
            crash_count
        );
    }
}

#[test]
fn test_max_backoff_count_derivation() {
    let cases = [
        (Duration::from_secs(20 * 60), 5),
        (Duration::from_secs(16 * 60), 5),
        (Duration::from_secs(8 * 60), 4),
        (Duration::from_secs(119), 2),
        (Duration::from_secs(120), 2),
        (CRASH_BACKOFF_MIN_DURATION, 0),
    ];

    for (max_backoff, expected) in cases {
        let calc = RestartPolicyConfig::default()
            .with_max_backoff_duration(max_backoff)
            .build()
            .unwrap();
        assert_eq!(calc.max_backoff_count(), expected, "{:?}", max_backoff);
    }
}

#[test]
fn test_backoff_never_exceeds_ceiling() {
    let calc = RestartCalculator::default();
    for crash_count in 0..calc.max_restarts() {
        let backoff = calc.backoff_for(crash_count).unwrap();
        assert!(backoff <= DEFAULT_MAX_BACKOFF_DURATION, "crash {}", crash_count);
    }
    assert_eq!(calc.backoff_for(calc.max_restarts()), None);
}

#[test]
fn test_short_ceiling_fails_validation() {
    let calc = RestartCalculator::new(3, Duration::from_secs(1), 200);
    assert!(calc.validate().is_err());

    let err = RestartPolicyConfig::default()
        .with_max_backoff_duration(Duration::from_secs(1))
        .build()
        .unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
}

#[test]
fn test_actual_lrp_restart_needs_crashed_state() {
    let calc = calculator_119s();
    let mut lrp = ActualLrp::new_unclaimed(lrp_key(), 10 * SECOND);
    lrp.crash_count = 4;

    for state in [
        ActualLrpState::Unclaimed,
        ActualLrpState::Claimed,
        ActualLrpState::Running,
    ] {
        lrp.state = state;
        assert!(!lrp.should_restart_crash(i64::MAX, &calc), "{}", state);
    }

    lrp.state = ActualLrpState::Crashed;
    assert!(!lrp.should_restart_crash(69 * SECOND, &calc));
    assert!(lrp.should_restart_crash(70 * SECOND, &calc));
}
