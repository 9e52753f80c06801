// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Type-tagged wire encoding for [`Action`].
//!
//! Encoding writes `{"<tag>": <variant fields>}`. Decoding requires exactly
//! one key and resolves it through the action registry, the single list of
//! known tags. Adding an action kind means adding a row there.

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use super::{
    Action, ActionVariant, CodependentAction, DownloadAction, EmitProgressAction, ParallelAction,
    RunAction, SerialAction, TimeoutAction, TryAction, UploadAction, action_types,
};
use crate::error::ActionCodecError;

type ActionDecoder = fn(Value) -> Result<Action, serde_json::Error>;

fn decode_variant<T: ActionVariant>(payload: Value) -> Result<Action, serde_json::Error> {
    serde_json::from_value::<T>(payload).map(Into::into)
}

macro_rules! registry_entry {
    ($ty:ty) => {
        (
            <$ty as ActionVariant>::ACTION_TYPE,
            decode_variant::<$ty> as ActionDecoder,
        )
    };
}

static ACTION_REGISTRY: &[(&str, ActionDecoder)] = &[
    registry_entry!(DownloadAction),
    registry_entry!(EmitProgressAction),
    registry_entry!(RunAction),
    registry_entry!(UploadAction),
    registry_entry!(TimeoutAction),
    registry_entry!(TryAction),
    registry_entry!(ParallelAction),
    registry_entry!(SerialAction),
    registry_entry!(CodependentAction),
];

/// Every tag the decoder accepts, in registry order.
pub const ACTION_TYPES: [&str; 9] = [
    action_types::DOWNLOAD,
    action_types::EMIT_PROGRESS,
    action_types::RUN,
    action_types::UPLOAD,
    action_types::TIMEOUT,
    action_types::TRY,
    action_types::PARALLEL,
    action_types::SERIAL,
    action_types::CODEPENDENT,
];

/// Decode an envelope that has already been parsed into JSON.
///
/// Anything other than a single-key object is `InvalidAction`; an
/// unregistered key is `UnknownAction`.
pub fn decode_action(envelope: Value) -> Result<Action, ActionCodecError> {
    let Value::Object(map) = envelope else {
        debug!("rejecting action envelope that is not an object");
        return Err(ActionCodecError::InvalidAction);
    };
    from_envelope(map)
}

fn from_envelope(map: Map<String, Value>) -> Result<Action, ActionCodecError> {
    if map.len() != 1 {
        debug!(keys = map.len(), "rejecting action envelope with wrong key count");
        return Err(ActionCodecError::InvalidAction);
    }
    let Some((tag, payload)) = map.into_iter().next() else {
        return Err(ActionCodecError::InvalidAction);
    };

    let entry = ACTION_REGISTRY.iter().find(|(t, _)| *t == tag).copied();
    let Some((action_type, decode)) = entry else {
        debug!(action_type = %tag, "rejecting unknown action type");
        return Err(ActionCodecError::UnknownAction(tag));
    };

    decode(payload).map_err(|source| ActionCodecError::Payload {
        action: action_type,
        source,
    })
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Action::Download(a) => map.serialize_entry(action_types::DOWNLOAD, a)?,
            Action::Upload(a) => map.serialize_entry(action_types::UPLOAD, a)?,
            Action::Run(a) => map.serialize_entry(action_types::RUN, a)?,
            Action::Timeout(a) => map.serialize_entry(action_types::TIMEOUT, a)?,
            Action::Try(a) => map.serialize_entry(action_types::TRY, a)?,
            Action::EmitProgress(a) => map.serialize_entry(action_types::EMIT_PROGRESS, a)?,
            Action::Parallel(a) => map.serialize_entry(action_types::PARALLEL, a)?,
            Action::Serial(a) => map.serialize_entry(action_types::SERIAL, a)?,
            Action::Codependent(a) => map.serialize_entry(action_types::CODEPENDENT, a)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let envelope = Value::deserialize(deserializer)?;
        decode_action(envelope).map_err(D::Error::custom)
    }
}
