// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Action trees: the step descriptors that make up a container's
//! setup/run/monitor lifecycle.
//!
//! An [`Action`] is an envelope holding exactly one concrete variant. On the
//! wire it is a JSON object with a single key naming the variant:
//!
//! ```json
//! {"try": {"action": {"download": {"from": "http://x", "to": "/tmp/x", ...}}}}
//! ```
//!
//! | Tag | Variant | Children |
//! |-----|---------|----------|
//! | `download` | [`DownloadAction`] | - |
//! | `upload` | [`UploadAction`] | - |
//! | `run` | [`RunAction`] | - |
//! | `timeout` | [`TimeoutAction`] | 1 |
//! | `try` | [`TryAction`] | 1 |
//! | `emit_progress` | [`EmitProgressAction`] | 1 |
//! | `parallel` | [`ParallelAction`] | N |
//! | `serial` | [`SerialAction`] | N |
//! | `codependent` | [`CodependentAction`] | N |
//!
//! The combinators only describe intent. Parallel runs children concurrently
//! and fails if any fails; Serial runs them in order and stops at the first
//! failure; Codependent runs them concurrently and stops every sibling as soon
//! as one exits. Executing them is the job of the cell, not of this crate.

mod codec;
mod types;
mod validation;

pub use codec::{ACTION_TYPES, decode_action};
pub use types::*;

use crate::validation::{ValidationError, Validator};

/// Registered action type tags.
pub mod action_types {
    pub const DOWNLOAD: &str = "download";
    pub const EMIT_PROGRESS: &str = "emit_progress";
    pub const RUN: &str = "run";
    pub const UPLOAD: &str = "upload";
    pub const TIMEOUT: &str = "timeout";
    pub const TRY: &str = "try";
    pub const PARALLEL: &str = "parallel";
    pub const SERIAL: &str = "serial";
    pub const CODEPENDENT: &str = "codependent";
}

/// Behaviour shared by every action variant.
pub trait ActionInterface: Validator + std::fmt::Debug {
    /// The tag naming this variant on the wire.
    fn action_type(&self) -> &'static str;
}

/// A concrete variant that can be decoded from its tagged payload.
pub(crate) trait ActionVariant:
    ActionInterface + serde::de::DeserializeOwned + Into<Action>
{
    const ACTION_TYPE: &'static str;
}

/// Envelope around exactly one action variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Download(DownloadAction),
    Upload(UploadAction),
    Run(RunAction),
    Timeout(TimeoutAction),
    Try(TryAction),
    EmitProgress(EmitProgressAction),
    Parallel(ParallelAction),
    Serial(SerialAction),
    Codependent(CodependentAction),
}

macro_rules! register_variant {
    ($variant:ident, $ty:ty, $tag:expr, $accessor:ident) => {
        impl ActionInterface for $ty {
            fn action_type(&self) -> &'static str {
                $tag
            }
        }

        impl ActionVariant for $ty {
            const ACTION_TYPE: &'static str = $tag;
        }

        impl From<$ty> for Action {
            fn from(action: $ty) -> Self {
                Action::$variant(action)
            }
        }

        impl Action {
            pub fn $accessor(&self) -> Option<&$ty> {
                match self {
                    Action::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

register_variant!(Download, DownloadAction, action_types::DOWNLOAD, as_download);
register_variant!(Upload, UploadAction, action_types::UPLOAD, as_upload);
register_variant!(Run, RunAction, action_types::RUN, as_run);
register_variant!(Timeout, TimeoutAction, action_types::TIMEOUT, as_timeout);
register_variant!(Try, TryAction, action_types::TRY, as_try);
register_variant!(
    EmitProgress,
    EmitProgressAction,
    action_types::EMIT_PROGRESS,
    as_emit_progress
);
register_variant!(Parallel, ParallelAction, action_types::PARALLEL, as_parallel);
register_variant!(Serial, SerialAction, action_types::SERIAL, as_serial);
register_variant!(
    Codependent,
    CodependentAction,
    action_types::CODEPENDENT,
    as_codependent
);

impl Action {
    /// Wrap a concrete variant.
    pub fn wrap(action: impl Into<Action>) -> Self {
        action.into()
    }

    /// Borrow the concrete variant.
    pub fn inner(&self) -> &dyn ActionInterface {
        match self {
            Action::Download(a) => a,
            Action::Upload(a) => a,
            Action::Run(a) => a,
            Action::Timeout(a) => a,
            Action::Try(a) => a,
            Action::EmitProgress(a) => a,
            Action::Parallel(a) => a,
            Action::Serial(a) => a,
            Action::Codependent(a) => a,
        }
    }

    /// The tag naming the wrapped variant.
    pub fn action_type(&self) -> &'static str {
        self.inner().action_type()
    }

    pub fn log_source(&self) -> &str {
        match self {
            Action::Download(a) => &a.log_source,
            Action::Upload(a) => &a.log_source,
            Action::Run(a) => &a.log_source,
            Action::Timeout(a) => &a.log_source,
            Action::Try(a) => &a.log_source,
            Action::EmitProgress(a) => &a.log_source,
            Action::Parallel(a) => &a.log_source,
            Action::Serial(a) => &a.log_source,
            Action::Codependent(a) => &a.log_source,
        }
    }

    /// Stamp `log_source` on the wrapped variant. Children keep their own.
    pub fn with_log_source(mut self, log_source: impl Into<String>) -> Self {
        let log_source = log_source.into();
        let slot = match &mut self {
            Action::Download(a) => &mut a.log_source,
            Action::Upload(a) => &mut a.log_source,
            Action::Run(a) => &mut a.log_source,
            Action::Timeout(a) => &mut a.log_source,
            Action::Try(a) => &mut a.log_source,
            Action::EmitProgress(a) => &mut a.log_source,
            Action::Parallel(a) => &mut a.log_source,
            Action::Serial(a) => &mut a.log_source,
            Action::Codependent(a) => &mut a.log_source,
        };
        *slot = log_source;
        self
    }
}

impl Validator for Action {
    fn validate(&self) -> Result<(), ValidationError> {
        self.inner().validate()
    }
}
