// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Field-level validation primitives shared by every record.
//!
//! Validation never short-circuits: each record runs all of its independent
//! checks, appends every failure to a [`ValidationError`], and returns the
//! aggregate in one pass.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use url::Url;

/// Maximum size of a free-form annotation, in bytes.
pub const MAX_ANNOTATION_SIZE: usize = 10 * 1024;

/// Maximum combined size of all route payloads on a desired LRP, in bytes.
pub const MAX_ROUTES_SIZE: usize = 4 * 1024;

/// Upper bound for `cpu_weight`.
pub const MAX_CPU_WEIGHT: u32 = 100;

static GUID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("guid pattern is a valid regex"));

/// Returns true if `guid` is a valid process or task guid.
pub fn is_valid_guid(guid: &str) -> bool {
    GUID_PATTERN.is_match(guid)
}

/// Anything that can check its own fields.
pub trait Validator {
    /// Run every check and return all failures together.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// A single failed check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// A named field is missing, empty or out of range.
    #[error("Invalid field: {field}")]
    InvalidField {
        /// Name of the offending field.
        field: String,
    },

    /// A mandatory action slot is absent.
    #[error("Invalid action type")]
    InvalidActionType,

    /// A named field failed a check that has something more to say.
    #[error("Invalid field: {field}: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl FieldError {
    pub fn invalid_field(field: impl Into<String>) -> Self {
        FieldError::InvalidField {
            field: field.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        FieldError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the field this error is about.
    pub fn field(&self) -> &str {
        match self {
            FieldError::InvalidField { field } | FieldError::Invalid { field, .. } => field,
            FieldError::InvalidActionType => "action",
        }
    }
}

/// Ordered, flat collection of field errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an error. Appending another `ValidationError` splices its
    /// elements in order rather than nesting it.
    pub fn append(&mut self, err: impl Into<ValidationError>) {
        self.errors.extend(err.into().errors);
    }

    /// Append the failure of `result`, if any.
    pub fn check(&mut self, result: Result<(), ValidationError>) {
        if let Err(err) = result {
            self.append(err);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Returns true if any element refers to `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field() == field)
    }

    /// `Ok(())` when nothing was appended, otherwise the aggregate itself.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<FieldError> for ValidationError {
    fn from(err: FieldError) -> Self {
        ValidationError { errors: vec![err] }
    }
}

impl FromIterator<FieldError> for ValidationError {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        ValidationError {
            errors: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ValidationError {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationError {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join(", "))
    }
}

impl std::error::Error for ValidationError {}

/// Checksum algorithms accepted on downloads and cached dependencies.
const CHECKSUM_ALGORITHMS: &[&str] = &["md5", "sha1", "sha256", "sha512"];

/// Shared checksum rules: value and algorithm come as a pair, and the
/// algorithm must be one we know how to verify.
pub(crate) fn validate_checksum(algorithm: &str, value: &str, errors: &mut ValidationError) {
    match (algorithm.is_empty(), value.is_empty()) {
        (true, false) => errors.append(FieldError::invalid_field("checksum algorithm")),
        (false, true) => errors.append(FieldError::invalid_field("checksum value")),
        (false, false) => {
            let lowered = algorithm.to_lowercase();
            if !CHECKSUM_ALGORITHMS.contains(&lowered.as_str()) {
                errors.append(FieldError::invalid(
                    "checksum algorithm",
                    format!("unsupported algorithm '{}'", algorithm),
                ));
            }
        }
        (true, true) => {}
    }
}

/// True if `raw` parses as an absolute URL.
pub(crate) fn has_url_scheme(raw: &str) -> bool {
    Url::parse(raw).is_ok()
}
