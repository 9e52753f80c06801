// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for bbs-models.

use thiserror::Error;

use crate::validation::ValidationError;

/// Result type using ModelError
pub type Result<T> = std::result::Result<T, ModelError>;

/// Failures decoding an action envelope.
///
/// These are fatal to the decode call and never folded into a
/// [`ValidationError`].
#[derive(Debug, Error)]
pub enum ActionCodecError {
    /// The envelope did not have exactly one key.
    #[error("invalid action")]
    InvalidAction,

    /// The envelope key is not a registered action type.
    #[error("unknown action: `{0}`")]
    UnknownAction(String),

    /// The key was known but its payload did not decode.
    #[error("invalid {action} action payload: {source}")]
    Payload {
        /// Action type named by the envelope key.
        action: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The bytes were not a JSON object at all.
    #[error("malformed action envelope: {0}")]
    Json(#[from] serde_json::Error),
}

/// Crate-wide error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    /// One or more fields failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// An action envelope could not be decoded.
    #[error(transparent)]
    ActionCodec(#[from] ActionCodecError),

    /// A record could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error (invalid environment variable)
    #[error("configuration error: {0}")]
    Config(String),

    /// A record was asked to move to a state it cannot reach from its current one.
    #[error("Cannot transition from {from} to {to}")]
    InvalidStateTransition {
        /// Current state.
        from: String,
        /// Requested state.
        to: String,
    },
}

impl ModelError {
    /// Get the error code string for this error type.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ActionCodec(ActionCodecError::UnknownAction(_)) => "UNKNOWN_ACTION",
            Self::ActionCodec(_) => "INVALID_ACTION",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Config(_) => "CONFIGURATION_ERROR",
            Self::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FieldError;

    #[test]
    fn test_model_error_codes() {
        let test_cases = vec![
            (
                ModelError::Validation(FieldError::invalid_field("domain").into()),
                "VALIDATION_ERROR",
            ),
            (
                ModelError::ActionCodec(ActionCodecError::InvalidAction),
                "INVALID_ACTION",
            ),
            (
                ModelError::ActionCodec(ActionCodecError::UnknownAction("bogus".to_string())),
                "UNKNOWN_ACTION",
            ),
            (
                ModelError::Config("bad".to_string()),
                "CONFIGURATION_ERROR",
            ),
            (
                ModelError::InvalidStateTransition {
                    from: "PENDING".to_string(),
                    to: "RESOLVING".to_string(),
                },
                "INVALID_STATE_TRANSITION",
            ),
        ];

        for (error, expected_code) in test_cases {
            assert_eq!(
                error.error_code(),
                expected_code,
                "Error {:?} should have code {}",
                error,
                expected_code
            );
            assert!(!error.to_string().is_empty(), "Message should not be empty");
        }
    }

    #[test]
    fn test_codec_error_display() {
        assert_eq!(ActionCodecError::InvalidAction.to_string(), "invalid action");
        assert_eq!(
            ActionCodecError::UnknownAction("bogus_tag".to_string()).to_string(),
            "unknown action: `bogus_tag`"
        );
    }

    #[test]
    fn test_transition_error_display() {
        let err = ModelError::InvalidStateTransition {
            from: "PENDING".to_string(),
            to: "RESOLVING".to_string(),
        };
        assert_eq!(err.to_string(), "Cannot transition from PENDING to RESOLVING");
    }
}
