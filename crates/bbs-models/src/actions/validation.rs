// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Recursive validation of action trees.
//!
//! Leaves check their own fields. Wrappers and combinators check that their
//! child slots are populated, then recurse into each child and splice the
//! child's errors into their own. Every slot is visited even after a failure.

use super::{
    Action, CodependentAction, DownloadAction, EmitProgressAction, ParallelAction, RunAction,
    SerialAction, TimeoutAction, TryAction, UploadAction,
};
use crate::validation::{FieldError, ValidationError, Validator, validate_checksum};

/// A unary wrapper's child: missing is an error, present is recursed into.
fn validate_child(action: Option<&Action>, errors: &mut ValidationError) {
    match action {
        None => errors.append(FieldError::invalid_field("action")),
        Some(action) => errors.check(action.validate()),
    }
}

/// An n-ary combinator's children: a missing list is one error, each missing
/// slot is reported with its index.
fn validate_children(actions: Option<&[Option<Action>]>, errors: &mut ValidationError) {
    let Some(slots) = actions else {
        errors.append(FieldError::invalid_field("actions"));
        return;
    };

    for (index, slot) in slots.iter().enumerate() {
        match slot {
            None => errors.append(FieldError::invalid_field(format!(
                "action at index {}",
                index
            ))),
            Some(action) => errors.check(action.validate()),
        }
    }
}

impl Validator for DownloadAction {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        if self.from.is_empty() {
            errors.append(FieldError::invalid_field("from"));
        }
        if self.to.is_empty() {
            errors.append(FieldError::invalid_field("to"));
        }
        validate_checksum(&self.checksum_algorithm, &self.checksum_value, &mut errors);

        errors.into_result()
    }
}

impl Validator for UploadAction {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        if self.from.is_empty() {
            errors.append(FieldError::invalid_field("from"));
        }
        if self.to.is_empty() {
            errors.append(FieldError::invalid_field("to"));
        }

        errors.into_result()
    }
}

impl Validator for RunAction {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        if self.path.is_empty() {
            errors.append(FieldError::invalid_field("path"));
        }
        if self.user.is_empty() {
            errors.append(FieldError::invalid_field("user"));
        }
        for var in &self.env {
            errors.check(var.validate());
        }

        errors.into_result()
    }
}

impl Validator for TimeoutAction {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        validate_child(self.action.as_deref(), &mut errors);
        if self.timeout_ns <= 0 {
            errors.append(FieldError::invalid_field("timeout"));
        }

        errors.into_result()
    }
}

impl Validator for TryAction {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        validate_child(self.action.as_deref(), &mut errors);
        errors.into_result()
    }
}

impl Validator for EmitProgressAction {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        validate_child(self.action.as_deref(), &mut errors);
        errors.into_result()
    }
}

impl Validator for ParallelAction {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        validate_children(self.actions.as_deref(), &mut errors);
        errors.into_result()
    }
}

impl Validator for SerialAction {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        validate_children(self.actions.as_deref(), &mut errors);
        errors.into_result()
    }
}

impl Validator for CodependentAction {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        validate_children(self.actions.as_deref(), &mut errors);
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::EnvironmentVariable;
    use std::time::Duration;

    fn valid_download() -> Action {
        DownloadAction::new("http://example.com/droplet.tgz", "/tmp/app").into()
    }

    fn invalid_download() -> Action {
        DownloadAction::default().into()
    }

    fn fields(err: &ValidationError) -> Vec<String> {
        err.iter().map(|e| e.to_string()).collect()
    }

    // === Leaf Tests ===

    #[test]
    fn test_download_requires_from_and_to() {
        assert!(valid_download().validate().is_ok());

        let err = invalid_download().validate().unwrap_err();
        assert_eq!(fields(&err), vec!["Invalid field: from", "Invalid field: to"]);
    }

    #[test]
    fn test_download_checksum_pairs() {
        let mut download = DownloadAction::new("http://x", "/tmp/x");
        download.checksum_value = "deadbeef".to_string();
        let err = download.validate().unwrap_err();
        assert!(err.has_field("checksum algorithm"));

        download.checksum_algorithm = "sha256".to_string();
        assert!(download.validate().is_ok());

        download.checksum_algorithm = "rot13".to_string();
        assert!(download.validate().unwrap_err().has_field("checksum algorithm"));
    }

    #[test]
    fn test_upload_requires_from_and_to() {
        assert!(UploadAction::new("/tmp/out", "http://blobstore").validate().is_ok());

        let err = UploadAction::default().validate().unwrap_err();
        assert!(err.has_field("from"));
        assert!(err.has_field("to"));
    }

    #[test]
    fn test_run_requires_path_and_user() {
        assert!(RunAction::new("/bin/sh", "vcap").validate().is_ok());

        let err = RunAction::default().validate().unwrap_err();
        assert_eq!(fields(&err), vec!["Invalid field: path", "Invalid field: user"]);
    }

    #[test]
    fn test_run_validates_env_names() {
        let run = RunAction::new("/bin/sh", "vcap")
            .with_env(vec![EnvironmentVariable::new("", "orphan")]);
        assert!(run.validate().unwrap_err().has_field("name"));
    }

    // === Unary Wrapper Tests ===

    #[test]
    fn test_timeout_missing_action() {
        let timeout = TimeoutAction {
            action: None,
            timeout_ns: Duration::from_secs(5).as_nanos() as i64,
            log_source: String::new(),
        };
        let err = timeout.validate().unwrap_err();
        assert_eq!(fields(&err), vec!["Invalid field: action"]);
    }

    #[test]
    fn test_timeout_must_be_positive() {
        let zero = TimeoutAction::new(valid_download(), Duration::ZERO);
        assert!(zero.validate().unwrap_err().has_field("timeout"));

        let negative = TimeoutAction {
            timeout_ns: -1,
            ..TimeoutAction::new(valid_download(), Duration::ZERO)
        };
        assert!(negative.validate().unwrap_err().has_field("timeout"));
    }

    #[test]
    fn test_timeout_reports_both_failures() {
        let timeout = TimeoutAction::default();
        let err = timeout.validate().unwrap_err();
        assert_eq!(
            fields(&err),
            vec!["Invalid field: action", "Invalid field: timeout"]
        );
    }

    #[test]
    fn test_timeout_flattens_child_errors_alongside_its_own() {
        let timeout = TimeoutAction {
            timeout_ns: 0,
            ..TimeoutAction::new(invalid_download(), Duration::ZERO)
        };
        let err = timeout.validate().unwrap_err();
        assert_eq!(
            fields(&err),
            vec![
                "Invalid field: from",
                "Invalid field: to",
                "Invalid field: timeout"
            ]
        );
    }

    #[test]
    fn test_try_and_emit_progress_recurse() {
        assert!(TryAction::new(valid_download()).validate().is_ok());
        assert!(TryAction::default().validate().unwrap_err().has_field("action"));

        let emit = EmitProgressAction::new(invalid_download(), "start", "ok", "failed");
        let err = emit.validate().unwrap_err();
        assert!(err.has_field("from"));
        assert!(EmitProgressAction::default().validate().unwrap_err().has_field("action"));
    }

    // === N-ary Combinator Tests ===

    #[test]
    fn test_parallel_reports_every_empty_slot() {
        let parallel = ParallelAction::from_slots(vec![None, Some(valid_download()), None]);
        let err = parallel.validate().unwrap_err();
        assert_eq!(err.len(), 2);
        assert_eq!(
            fields(&err),
            vec![
                "Invalid field: action at index 0",
                "Invalid field: action at index 2"
            ]
        );
    }

    #[test]
    fn test_combinators_require_action_list() {
        assert!(ParallelAction::default().validate().unwrap_err().has_field("actions"));
        assert!(SerialAction::default().validate().unwrap_err().has_field("actions"));
        assert!(CodependentAction::default().validate().unwrap_err().has_field("actions"));
    }

    #[test]
    fn test_empty_action_list_is_valid() {
        assert!(SerialAction::new(Vec::<Action>::new()).validate().is_ok());
    }

    #[test]
    fn test_combinators_treat_children_identically() {
        let slots = || vec![Some(invalid_download()), None, Some(valid_download())];
        let expected = vec![
            "Invalid field: from",
            "Invalid field: to",
            "Invalid field: action at index 1",
        ];

        let parallel = ParallelAction::from_slots(slots()).validate().unwrap_err();
        let serial = SerialAction::from_slots(slots()).validate().unwrap_err();
        let codependent = CodependentAction::from_slots(slots()).validate().unwrap_err();

        assert_eq!(fields(&parallel), expected);
        assert_eq!(parallel, serial);
        assert_eq!(serial, codependent);
    }

    #[test]
    fn test_deep_tree_aggregates_all_levels() {
        let tree: Action = SerialAction::new(vec![
            Action::from(TryAction::new(ParallelAction::from_slots(vec![
                Some(invalid_download()),
                None,
            ]))),
            Action::from(TimeoutAction::new(RunAction::default(), Duration::ZERO)),
        ])
        .into();

        let err = tree.validate().unwrap_err();
        assert_eq!(
            fields(&err),
            vec![
                "Invalid field: from",
                "Invalid field: to",
                "Invalid field: action at index 1",
                "Invalid field: path",
                "Invalid field: user",
                "Invalid field: timeout",
            ]
        );
    }
}
