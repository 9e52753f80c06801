// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration tests for bbs-models.

use std::time::Duration;

use bbs_models::config::{
    ENV_IMMEDIATE_RESTARTS, ENV_MAX_BACKOFF_DURATION_SECS, ENV_MAX_RESTARTS,
};
use bbs_models::{ModelError, RestartPolicyConfig};

fn env_of(vars: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    move |name| {
        vars.iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }
}

#[test]
fn test_default_config() {
    let config = RestartPolicyConfig::default();
    assert_eq!(config.immediate_restarts, 3);
    assert_eq!(config.max_backoff_duration, Duration::from_secs(16 * 60));
    assert_eq!(config.max_restarts, 200);
}

#[test]
fn test_config_builder() {
    let config = RestartPolicyConfig::default()
        .with_immediate_restarts(1)
        .with_max_backoff_duration(Duration::from_secs(60))
        .with_max_restarts(5);

    assert_eq!(config.immediate_restarts, 1);
    assert_eq!(config.max_backoff_duration, Duration::from_secs(60));
    assert_eq!(config.max_restarts, 5);

    let calc = config.build().unwrap();
    assert_eq!(calc.max_backoff_count(), 1);
    assert!(calc.should_restart(0, 0, 0));
    assert!(!calc.should_restart(0, 0, 1));
}

#[test]
fn test_config_from_lookup_partial() {
    let config =
        RestartPolicyConfig::from_lookup(env_of(&[(ENV_MAX_BACKOFF_DURATION_SECS, "120")]))
            .unwrap();
    assert_eq!(config.max_backoff_duration, Duration::from_secs(120));
    assert_eq!(config.immediate_restarts, 3);
    assert_eq!(config.max_restarts, 200);
}

#[test]
fn test_config_from_lookup_rejects_garbage() {
    for var in [ENV_IMMEDIATE_RESTARTS, ENV_MAX_BACKOFF_DURATION_SECS, ENV_MAX_RESTARTS] {
        let vars: &'static [(&'static str, &'static str)] = match var {
            ENV_IMMEDIATE_RESTARTS => &[(ENV_IMMEDIATE_RESTARTS, "three")],
            ENV_MAX_BACKOFF_DURATION_SECS => &[(ENV_MAX_BACKOFF_DURATION_SECS, "-5")],
            _ => &[(ENV_MAX_RESTARTS, "")],
        };
        let err = RestartPolicyConfig::from_lookup(env_of(vars)).unwrap_err();
        assert!(matches!(err, ModelError::Config(_)), "{}", var);
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }
}
