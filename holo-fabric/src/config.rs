//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeSet;
use std::net::{Ipv4Addr, Ipv6Addr};

use ipnetwork::IpNetwork;

use crate::fabric::DeviceId;

// Device configuration errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigError {
    NotFound(DeviceId),
}

// Per-device configuration store.
//
// Lookups of devices that were never configured fail with a recoverable
// `ConfigError`; the caller decides whether to abort the current cycle.
pub trait DeviceConfig: Send + Sync {
    // Whether the device terminates subscriber subnets (edge) or only
    // transits traffic.
    fn is_edge_device(&self, device: DeviceId) -> Result<bool, ConfigError>;

    // The device's IPv4 router IP (its SR node segment).
    fn router_ipv4(&self, device: DeviceId) -> Result<Ipv4Addr, ConfigError>;

    // The device's IPv6 router IP, when one is configured.
    fn router_ipv6(&self, device: DeviceId) -> Option<Ipv6Addr>;

    // The subnets configured on the device.
    fn subnets_of(&self, device: DeviceId) -> BTreeSet<IpNetwork>;
}

// ===== impl ConfigError =====

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(device) => {
                write!(f, "device configuration not found for {device}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
