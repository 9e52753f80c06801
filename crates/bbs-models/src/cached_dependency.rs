// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Artifacts the cell fetches into its shared cache before a container
//! starts. Unlike a download action these are bind-mounted, not copied.

use serde::{Deserialize, Serialize};

use crate::validation::{FieldError, ValidationError, Validator, validate_checksum};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CachedDependency {
    pub name: String,
    pub from: String,
    pub to: String,
    pub cache_key: String,
    pub log_source: String,
    pub checksum_algorithm: String,
    pub checksum_value: String,
}

impl Validator for CachedDependency {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        if self.from.is_empty() {
            errors.append(FieldError::invalid_field("from"));
        }
        if self.to.is_empty() {
            errors.append(FieldError::invalid_field("to"));
        }
        if self.cache_key.is_empty() {
            errors.append(FieldError::invalid_field("cache_key"));
        }
        validate_checksum(&self.checksum_algorithm, &self.checksum_value, &mut errors);

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_from_to_and_cache_key() {
        let err = CachedDependency::default().validate().unwrap_err();
        let fields: Vec<&str> = err.iter().map(|e| e.field()).collect();
        assert_eq!(fields, vec!["from", "to", "cache_key"]);

        let dep = CachedDependency {
            from: "http://buildpacks/ruby.zip".to_string(),
            to: "/tmp/buildpacks/ruby".to_string(),
            cache_key: "ruby-buildpack".to_string(),
            ..Default::default()
        };
        assert!(dep.validate().is_ok());
    }
}
