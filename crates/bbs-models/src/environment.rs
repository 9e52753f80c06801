// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Environment variables handed to container processes.

use serde::{Deserialize, Serialize};

use crate::validation::{FieldError, ValidationError, Validator};

/// A single `NAME=value` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl EnvironmentVariable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Validator for EnvironmentVariable {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        if self.name.is_empty() {
            errors.append(FieldError::invalid_field("name"));
        }
        errors.into_result()
    }
}
