// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Egress rules: outbound network access granted to a container.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::validation::{FieldError, ValidationError, Validator};

pub const PROTOCOL_TCP: &str = "tcp";
pub const PROTOCOL_UDP: &str = "udp";
pub const PROTOCOL_ICMP: &str = "icmp";
pub const PROTOCOL_ALL: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IcmpInfo {
    #[serde(rename = "type")]
    pub icmp_type: i32,
    pub code: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EgressRule {
    pub protocol: String,
    #[serde(default)]
    pub destinations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_range: Option<PortRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icmp_info: Option<IcmpInfo>,
    #[serde(default)]
    pub log: bool,
}

impl EgressRule {
    pub fn new<I, S>(protocol: impl Into<String>, destinations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            protocol: protocol.into(),
            destinations: destinations.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    fn validate_ports(&self, errors: &mut ValidationError) {
        match (self.ports.is_empty(), &self.port_range) {
            (true, None) => errors.append(FieldError::invalid(
                "ports",
                "either ports or port_range is required",
            )),
            (false, Some(_)) => errors.append(FieldError::invalid(
                "port_range",
                "cannot be combined with ports",
            )),
            (true, Some(range)) if range.start > range.end => {
                errors.append(FieldError::invalid_field("port_range"))
            }
            _ => {}
        }
        if self.icmp_info.is_some() {
            errors.append(FieldError::invalid(
                "icmp_info",
                format!("not allowed for protocol {}", self.protocol),
            ));
        }
    }

    fn forbid_ports(&self, errors: &mut ValidationError) {
        if !self.ports.is_empty() {
            errors.append(FieldError::invalid(
                "ports",
                format!("not allowed for protocol {}", self.protocol),
            ));
        }
        if self.port_range.is_some() {
            errors.append(FieldError::invalid(
                "port_range",
                format!("not allowed for protocol {}", self.protocol),
            ));
        }
    }
}

impl Validator for EgressRule {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        match self.protocol.as_str() {
            PROTOCOL_TCP | PROTOCOL_UDP => self.validate_ports(&mut errors),
            PROTOCOL_ICMP => {
                if self.icmp_info.is_none() {
                    errors.append(FieldError::invalid_field("icmp_info"));
                }
                self.forbid_ports(&mut errors);
            }
            PROTOCOL_ALL => {
                self.forbid_ports(&mut errors);
                if self.icmp_info.is_some() {
                    errors.append(FieldError::invalid(
                        "icmp_info",
                        "not allowed for protocol all",
                    ));
                }
            }
            _ => errors.append(FieldError::invalid_field("protocol")),
        }

        if self.destinations.is_empty() {
            errors.append(FieldError::invalid_field("destinations"));
        }
        for destination in &self.destinations {
            if !is_valid_destination(destination) {
                errors.append(FieldError::invalid(
                    "destinations",
                    format!("invalid destination '{}'", destination),
                ));
            }
        }

        errors.into_result()
    }
}

/// An IPv4 address, an IPv4 CIDR block, or an ascending `a-b` range.
fn is_valid_destination(destination: &str) -> bool {
    if let Some((start, end)) = destination.split_once('-') {
        return match (start.parse::<Ipv4Addr>(), end.parse::<Ipv4Addr>()) {
            (Ok(start), Ok(end)) => u32::from(start) <= u32::from(end),
            _ => false,
        };
    }
    if let Some((addr, prefix)) = destination.split_once('/') {
        return addr.parse::<Ipv4Addr>().is_ok()
            && prefix.parse::<u8>().is_ok_and(|bits| bits <= 32);
    }
    destination.parse::<Ipv4Addr>().is_ok()
}
