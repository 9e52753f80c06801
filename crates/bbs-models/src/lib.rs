// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! BBS Models - record types, action trees and validation for the Diego
//! bulletin board system.
//!
//! This crate is the pure data layer of the control plane. It owns the
//! records clients submit (desired LRPs, tasks), the records cells report
//! (actual LRPs), the action trees that describe what a container runs, and
//! the rules that decide whether any of them is acceptable. It does no I/O.
//!
//! # Features
//!
//! - **Action Trees**: Download/Upload/Run leaves composed with Timeout, Try,
//!   EmitProgress, Parallel, Serial and Codependent
//! - **Wire Codec**: single-key tagged JSON envelopes, decoded through a static
//!   registry of variant decoders
//! - **Validation**: every failing field collected into one [`ValidationError`]
//! - **ActualLRP State Machine**: which ownership/state changes are legal
//! - **Restart Policy**: crash backoff with immediate restarts and a hard cap
//!
//! # Quick Start
//!
//! ```
//! use std::time::Duration;
//! use bbs_models::{Action, DownloadAction, RunAction, SerialAction, TimeoutAction, Validator};
//!
//! let action: Action = SerialAction::new([
//!     Action::from(DownloadAction::new("http://blobs/app.tgz", "/app")),
//!     TimeoutAction::new(RunAction::new("/app/start", "vcap"), Duration::from_secs(60)).into(),
//! ])
//! .into();
//!
//! assert!(action.validate().is_ok());
//!
//! let bytes = bbs_models::codec::marshal(&action).unwrap();
//! let decoded = bbs_models::codec::unmarshal_action(&bytes).unwrap();
//! assert_eq!(decoded, action);
//! ```
//!
//! # Restart Policy
//!
//! ```
//! use bbs_models::RestartPolicyConfig;
//!
//! let calculator = RestartPolicyConfig::default().build().unwrap();
//! // Third crash, 29 seconds after crashing: still backing off.
//! assert!(!calculator.should_restart(29_000_000_000, 0, 3));
//! ```

pub mod actions;
pub mod actual_lrp;
pub mod cached_dependency;
pub mod codec;
pub mod config;
mod definition;
pub mod desired_lrp;
pub mod egress;
pub mod environment;
pub mod error;
pub mod image_layer;
pub mod modification_tag;
pub mod restart;
pub mod task;
pub mod validation;

pub use actions::{
    Action, ActionInterface, CodependentAction, DownloadAction, EmitProgressAction,
    ParallelAction, ResourceLimits, RunAction, SerialAction, TimeoutAction, TryAction,
    UploadAction,
};
pub use actual_lrp::{
    ActualLrp, ActualLrpInstanceKey, ActualLrpKey, ActualLrpNetInfo, ActualLrpState, PortMapping,
};
pub use cached_dependency::CachedDependency;
pub use config::RestartPolicyConfig;
pub use desired_lrp::{DesiredLrp, DesiredLrpUpdate, Routes};
pub use egress::{EgressRule, IcmpInfo, PortRange};
pub use environment::EnvironmentVariable;
pub use error::{ActionCodecError, ModelError, Result};
pub use image_layer::{DigestAlgorithm, ImageLayer, ImageLayers, LayerType, MediaType};
pub use modification_tag::ModificationTag;
pub use restart::RestartCalculator;
pub use task::{Task, TaskDefinition, TaskState};
pub use validation::{FieldError, ValidationError, Validator};
