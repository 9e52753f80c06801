// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Byte-level encoding of records.
//!
//! Every record is plain serde; these helpers pin the format (JSON) and map
//! failures into [`ModelError`]. Actions get dedicated entry points so that
//! envelope failures keep their own error type.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::actions::{Action, decode_action};
use crate::error::{ActionCodecError, Result};

/// Encode any record.
pub fn marshal<T: Serialize + ?Sized>(record: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(record)?)
}

/// Decode any record.
pub fn unmarshal<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Encode an action envelope. No action encodes as `null`.
pub fn marshal_action(action: Option<&Action>) -> Result<Vec<u8>> {
    match action {
        Some(action) => marshal(action),
        None => Ok(b"null".to_vec()),
    }
}

/// Decode an action envelope.
pub fn unmarshal_action(bytes: &[u8]) -> std::result::Result<Action, ActionCodecError> {
    let envelope: serde_json::Value = serde_json::from_slice(bytes)?;
    decode_action(envelope)
}
