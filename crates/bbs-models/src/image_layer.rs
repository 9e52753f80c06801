// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Image layers declared on a desired LRP or task.
//!
//! Shared layers become [`CachedDependency`] records that the cell caches and
//! mounts. Exclusive layers become download actions that run, in parallel,
//! ahead of whatever setup action the definition already has.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::actions::{Action, DownloadAction, ParallelAction, SerialAction};
use crate::cached_dependency::CachedDependency;
use crate::validation::{FieldError, ValidationError, Validator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum LayerType {
    Shared,
    Exclusive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum MediaType {
    Tgz,
    Tar,
    Zip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum DigestAlgorithm {
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    /// Lowercase name used for checksums and cache keys.
    pub fn checksum_name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha512 => "sha512",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageLayer {
    #[serde(default)]
    pub name: String,
    pub url: String,
    pub destination_path: String,
    pub layer_type: LayerType,
    pub media_type: MediaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest_algorithm: Option<DigestAlgorithm>,
    #[serde(default)]
    pub digest_value: String,
}

impl ImageLayer {
    fn checksum_algorithm(&self) -> String {
        self.digest_algorithm
            .map(|a| a.checksum_name().to_string())
            .unwrap_or_default()
    }

    /// `<algorithm>:<digest>`, or `None` without a digest.
    fn digest_cache_key(&self) -> Option<String> {
        if self.digest_value.is_empty() {
            return None;
        }
        Some(format!("{}:{}", self.checksum_algorithm(), self.digest_value))
    }
}

impl Validator for ImageLayer {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        if self.url.is_empty() {
            errors.append(FieldError::invalid_field("url"));
        }
        if self.destination_path.is_empty() {
            errors.append(FieldError::invalid_field("destination_path"));
        }

        let exclusive = self.layer_type == LayerType::Exclusive;
        if (exclusive || !self.digest_value.is_empty()) && self.digest_algorithm.is_none() {
            errors.append(FieldError::invalid_field("digest_algorithm"));
        }
        if (exclusive || self.digest_algorithm.is_some()) && self.digest_value.is_empty() {
            errors.append(FieldError::invalid_field("digest_value"));
        }

        errors.into_result()
    }
}

/// An ordered list of image layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageLayers(pub Vec<ImageLayer>);

impl ImageLayers {
    pub fn filter_by_type(&self, layer_type: LayerType) -> impl Iterator<Item = &ImageLayer> {
        self.0.iter().filter(move |l| l.layer_type == layer_type)
    }

    /// Prepend downloads for every exclusive layer to `existing_action`.
    ///
    /// The downloads run in parallel; when there is an existing action the
    /// result is `Serial(Parallel(downloads), existing)`. Without exclusive
    /// layers `existing_action` comes back unchanged.
    pub fn to_download_actions(
        &self,
        legacy_download_user: &str,
        existing_action: Option<Action>,
    ) -> Option<Action> {
        let downloads: Vec<Action> = self
            .filter_by_type(LayerType::Exclusive)
            .map(|layer| {
                Action::from(DownloadAction {
                    artifact: layer.name.clone(),
                    from: layer.url.clone(),
                    to: layer.destination_path.clone(),
                    cache_key: layer.digest_cache_key().unwrap_or_default(),
                    log_source: String::new(),
                    user: legacy_download_user.to_string(),
                    checksum_algorithm: layer.checksum_algorithm(),
                    checksum_value: layer.digest_value.clone(),
                })
            })
            .collect();

        if downloads.is_empty() {
            return existing_action;
        }

        let parallel = Action::from(ParallelAction::new(downloads));
        Some(match existing_action {
            Some(existing) => SerialAction::new(vec![parallel, existing]).into(),
            None => parallel,
        })
    }

    /// Cached dependencies for every shared layer. Without a digest the
    /// layer URL doubles as the cache key.
    pub fn to_cached_dependencies(&self) -> Vec<CachedDependency> {
        self.filter_by_type(LayerType::Shared)
            .map(|layer| CachedDependency {
                name: layer.name.clone(),
                from: layer.url.clone(),
                to: layer.destination_path.clone(),
                cache_key: layer
                    .digest_cache_key()
                    .unwrap_or_else(|| layer.url.clone()),
                log_source: String::new(),
                checksum_algorithm: layer.checksum_algorithm(),
                checksum_value: layer.digest_value.clone(),
            })
            .collect()
    }
}

impl From<Vec<ImageLayer>> for ImageLayers {
    fn from(layers: Vec<ImageLayer>) -> Self {
        ImageLayers(layers)
    }
}

impl Validator for ImageLayers {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        for layer in &self.0 {
            errors.check(layer.validate());
        }
        errors.into_result()
    }
}
