// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! One-off tasks and their lifecycle.
//!
//! ```text
//! PENDING ──▶ RUNNING ──▶ COMPLETED ──▶ RESOLVING
//! ```

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use crate::actions::Action;
use crate::cached_dependency::CachedDependency;
use crate::definition::{
    validate_annotation, validate_cached_dependencies, validate_egress_rules,
    validate_environment, validate_limits, validate_main_action, validate_rootfs,
};
use crate::egress::EgressRule;
use crate::environment::EnvironmentVariable;
use crate::error::{ModelError, Result};
use crate::image_layer::ImageLayers;
use crate::validation::{FieldError, ValidationError, Validator, has_url_scheme, is_valid_guid};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum TaskState {
    #[default]
    Pending,
    Running,
    Completed,
    Resolving,
}

impl TaskState {
    /// The only state this one may move to, if any.
    pub fn next(&self) -> Option<TaskState> {
        match self {
            TaskState::Pending => Some(TaskState::Running),
            TaskState::Running => Some(TaskState::Completed),
            TaskState::Completed => Some(TaskState::Resolving),
            TaskState::Resolving => None,
        }
    }
}

/// What to run for a task and with which resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskDefinition {
    #[serde(rename = "rootfs")]
    pub root_fs: String,
    pub environment_variables: Vec<EnvironmentVariable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    pub disk_mb: i32,
    pub memory_mb: i32,
    pub cpu_weight: u32,
    pub max_pids: i32,
    pub privileged: bool,
    pub log_source: String,
    pub log_guid: String,
    pub metrics_guid: String,
    pub result_file: String,
    pub completion_callback_url: String,
    pub annotation: String,
    pub egress_rules: Vec<EgressRule>,
    pub cached_dependencies: Vec<CachedDependency>,
    pub legacy_download_user: String,
    pub placement_tags: Vec<String>,
    pub image_layers: ImageLayers,
}

impl TaskDefinition {
    pub fn new(root_fs: impl Into<String>, action: impl Into<Action>) -> Self {
        Self {
            root_fs: root_fs.into(),
            action: Some(action.into()),
            ..Default::default()
        }
    }
}

impl Validator for TaskDefinition {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        validate_rootfs(&self.root_fs, &mut errors);
        validate_main_action(self.action.as_ref(), &mut errors);
        validate_limits(
            self.cpu_weight,
            self.memory_mb,
            self.disk_mb,
            self.max_pids,
            &mut errors,
        );
        validate_annotation(&self.annotation, &mut errors);
        if !self.completion_callback_url.is_empty() && !has_url_scheme(&self.completion_callback_url)
        {
            errors.append(FieldError::invalid_field("completion_callback_url"));
        }
        validate_environment(&self.environment_variables, &mut errors);
        validate_egress_rules(&self.egress_rules, &mut errors);
        validate_cached_dependencies(&self.cached_dependencies, &mut errors);
        errors.check(self.image_layers.validate());

        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    pub task_guid: String,
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_definition: Option<TaskDefinition>,
    pub state: TaskState,
    pub cell_id: String,
    pub result: String,
    pub failed: bool,
    pub failure_reason: String,
    /// Unix nanoseconds.
    pub created_at: i64,
    pub updated_at: i64,
    pub first_completed_at: i64,
    pub rejection_count: i32,
    pub rejection_reason: String,
}

impl Task {
    pub fn new(
        task_guid: impl Into<String>,
        domain: impl Into<String>,
        definition: TaskDefinition,
    ) -> Self {
        Self {
            task_guid: task_guid.into(),
            domain: domain.into(),
            task_definition: Some(definition),
            ..Default::default()
        }
    }

    /// Fails unless `to` directly follows the current state.
    pub fn validate_transition_to(&self, to: TaskState) -> Result<()> {
        if self.state.next() == Some(to) {
            return Ok(());
        }
        debug!(
            task_guid = %self.task_guid,
            from = %self.state,
            to = %to,
            "refusing task transition"
        );
        Err(ModelError::InvalidStateTransition {
            from: self.state.to_string(),
            to: to.to_string(),
        })
    }
}

impl Validator for Task {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        if self.domain.is_empty() {
            errors.append(FieldError::invalid_field("domain"));
        }
        if !is_valid_guid(&self.task_guid) {
            errors.append(FieldError::invalid_field("task_guid"));
        }
        match &self.task_definition {
            None => errors.append(FieldError::invalid_field("task_definition")),
            Some(definition) => errors.check(definition.validate()),
        }

        if !errors.is_empty() {
            debug!(
                task_guid = %self.task_guid,
                error_count = errors.len(),
                "task failed validation"
            );
        }
        errors.into_result()
    }
}
