// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Checks shared by desired LRP and task definitions.

use tracing::debug;

use crate::actions::Action;
use crate::cached_dependency::CachedDependency;
use crate::egress::EgressRule;
use crate::environment::EnvironmentVariable;
use crate::validation::{
    FieldError, MAX_ANNOTATION_SIZE, MAX_CPU_WEIGHT, ValidationError, Validator, has_url_scheme,
};

pub(crate) fn validate_rootfs(rootfs: &str, errors: &mut ValidationError) {
    if !has_url_scheme(rootfs) {
        errors.append(FieldError::invalid_field("rootfs"));
    }
}

/// The main action is mandatory; its absence is reported as an invalid
/// action type rather than a missing field.
pub(crate) fn validate_main_action(action: Option<&Action>, errors: &mut ValidationError) {
    match action {
        None => errors.append(FieldError::InvalidActionType),
        Some(action) => validate_action_tree("action", action, errors),
    }
}

pub(crate) fn validate_action_tree(slot: &str, action: &Action, errors: &mut ValidationError) {
    if let Err(err) = action.validate() {
        debug!(
            slot,
            action_type = action.action_type(),
            error_count = err.len(),
            "action tree failed validation"
        );
        errors.append(err);
    }
}

pub(crate) fn validate_limits(
    cpu_weight: u32,
    memory_mb: i32,
    disk_mb: i32,
    max_pids: i32,
    errors: &mut ValidationError,
) {
    if cpu_weight > MAX_CPU_WEIGHT {
        errors.append(FieldError::invalid_field("cpu_weight"));
    }
    if memory_mb < 0 {
        errors.append(FieldError::invalid_field("memory_mb"));
    }
    if disk_mb < 0 {
        errors.append(FieldError::invalid_field("disk_mb"));
    }
    if max_pids < 0 {
        errors.append(FieldError::invalid_field("max_pids"));
    }
}

pub(crate) fn validate_annotation(annotation: &str, errors: &mut ValidationError) {
    if annotation.len() > MAX_ANNOTATION_SIZE {
        errors.append(FieldError::invalid(
            "annotation",
            format!("length exceeds {} bytes", MAX_ANNOTATION_SIZE),
        ));
    }
}

pub(crate) fn validate_environment(env: &[EnvironmentVariable], errors: &mut ValidationError) {
    for var in env {
        errors.check(var.validate());
    }
}

/// A failing egress rule is reported once, against `egress_rules`.
pub(crate) fn validate_egress_rules(rules: &[EgressRule], errors: &mut ValidationError) {
    for rule in rules {
        if rule.validate().is_err() {
            errors.append(FieldError::invalid_field("egress_rules"));
        }
    }
}

pub(crate) fn validate_cached_dependencies(
    dependencies: &[CachedDependency],
    errors: &mut ValidationError,
) {
    for dependency in dependencies {
        errors.check(dependency.validate());
    }
}
