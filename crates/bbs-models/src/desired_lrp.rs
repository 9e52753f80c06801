// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Desired LRPs: the long-running processes a client asked the cluster to run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::actions::Action;
use crate::actual_lrp::ActualLrpKey;
use crate::cached_dependency::CachedDependency;
use crate::definition::{
    validate_action_tree, validate_annotation, validate_cached_dependencies,
    validate_egress_rules, validate_environment, validate_limits, validate_main_action,
    validate_rootfs,
};
use crate::egress::EgressRule;
use crate::environment::EnvironmentVariable;
use crate::image_layer::ImageLayers;
use crate::modification_tag::ModificationTag;
use crate::validation::{FieldError, MAX_ROUTES_SIZE, ValidationError, Validator, is_valid_guid};

/// Router payloads keyed by router name. Values are opaque to this crate.
pub type Routes = BTreeMap<String, serde_json::Value>;

/// Combined encoded length of every route payload.
pub fn routes_size(routes: &Routes) -> usize {
    routes
        .values()
        .map(|payload| serde_json::to_vec(payload).map(|b| b.len()).unwrap_or(0))
        .sum()
}

fn validate_routes(routes: &Routes, errors: &mut ValidationError) {
    let size = routes_size(routes);
    if size > MAX_ROUTES_SIZE {
        errors.append(FieldError::invalid(
            "routes",
            format!("{} bytes exceeds the limit of {}", size, MAX_ROUTES_SIZE),
        ));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesiredLrp {
    pub process_guid: String,
    pub domain: String,
    #[serde(rename = "rootfs")]
    pub root_fs: String,
    pub instances: i32,
    pub environment_variables: Vec<EnvironmentVariable>,
    pub cached_dependencies: Vec<CachedDependency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup: Option<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor: Option<Action>,
    pub start_timeout_ms: i64,
    pub disk_mb: i32,
    pub memory_mb: i32,
    pub cpu_weight: u32,
    pub max_pids: i32,
    pub privileged: bool,
    pub ports: Vec<u32>,
    pub routes: Routes,
    pub log_source: String,
    pub log_guid: String,
    pub metrics_guid: String,
    pub annotation: String,
    pub egress_rules: Vec<EgressRule>,
    pub modification_tag: ModificationTag,
    pub placement_tags: Vec<String>,
    pub image_layers: ImageLayers,
    pub legacy_download_user: String,
}

impl DesiredLrp {
    pub fn new(
        process_guid: impl Into<String>,
        domain: impl Into<String>,
        root_fs: impl Into<String>,
        action: impl Into<Action>,
    ) -> Self {
        Self {
            process_guid: process_guid.into(),
            domain: domain.into(),
            root_fs: root_fs.into(),
            action: Some(action.into()),
            ..Default::default()
        }
    }

    /// Key of the actual LRP at `index`.
    pub fn actual_lrp_key(&self, index: i32) -> ActualLrpKey {
        ActualLrpKey::new(self.process_guid.clone(), index, self.domain.clone())
    }

    /// Fold image layers into the older representation: exclusive layers
    /// become downloads run ahead of `setup`, shared layers become cached
    /// dependencies. The layer list is emptied.
    pub fn resolve_image_layers(&mut self) {
        let layers = std::mem::take(&mut self.image_layers);
        self.setup = layers.to_download_actions(&self.legacy_download_user, self.setup.take());
        self.cached_dependencies.extend(layers.to_cached_dependencies());
    }

    /// Apply the mutable subset of fields and bump the modification tag.
    pub fn apply_update(&mut self, update: &DesiredLrpUpdate) {
        if let Some(instances) = update.instances {
            self.instances = instances;
        }
        if let Some(routes) = &update.routes {
            self.routes = routes.clone();
        }
        if let Some(annotation) = &update.annotation {
            self.annotation = annotation.clone();
        }
        self.modification_tag.increment();
    }
}

impl Validator for DesiredLrp {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        if self.domain.is_empty() {
            errors.append(FieldError::invalid_field("domain"));
        }
        if !is_valid_guid(&self.process_guid) {
            errors.append(FieldError::invalid_field("process_guid"));
        }
        validate_rootfs(&self.root_fs, &mut errors);
        if self.instances < 0 {
            errors.append(FieldError::invalid_field("instances"));
        }

        if let Some(setup) = &self.setup {
            validate_action_tree("setup", setup, &mut errors);
        }
        validate_main_action(self.action.as_ref(), &mut errors);
        if let Some(monitor) = &self.monitor {
            validate_action_tree("monitor", monitor, &mut errors);
        }

        validate_limits(
            self.cpu_weight,
            self.memory_mb,
            self.disk_mb,
            self.max_pids,
            &mut errors,
        );
        validate_annotation(&self.annotation, &mut errors);
        validate_routes(&self.routes, &mut errors);
        validate_environment(&self.environment_variables, &mut errors);
        validate_egress_rules(&self.egress_rules, &mut errors);
        validate_cached_dependencies(&self.cached_dependencies, &mut errors);
        errors.check(self.image_layers.validate());

        if !errors.is_empty() {
            debug!(
                process_guid = %self.process_guid,
                error_count = errors.len(),
                "desired LRP failed validation"
            );
        }
        errors.into_result()
    }
}

/// Changes a client may make to an existing desired LRP.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesiredLrpUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instances: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routes: Option<Routes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

impl Validator for DesiredLrpUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        if self.instances.is_some_and(|i| i < 0) {
            errors.append(FieldError::invalid_field("instances"));
        }
        if let Some(annotation) = &self.annotation {
            validate_annotation(annotation, &mut errors);
        }
        if let Some(routes) = &self.routes {
            validate_routes(routes, &mut errors);
        }

        errors.into_result()
    }
}
