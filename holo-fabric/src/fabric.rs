//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use derive_new::new;
use serde::{Deserialize, Serialize};

// Switch datapath identifier.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct DeviceId(u64);

// Switch port identifier.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct PortId(u32);

// One end of a link: a port on a switch.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, new)]
#[derive(Deserialize, Serialize)]
pub struct ConnectPoint {
    pub device: DeviceId,
    pub port: PortId,
}

// Unidirectional fabric link.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, new)]
#[derive(Deserialize, Serialize)]
pub struct Link {
    pub src: ConnectPoint,
    pub dst: ConnectPoint,
}

// Live view of the fabric inventory.
//
// Implementations may block on their backing stores but must never call
// back into the routing instance.
pub trait FabricView: Send + Sync {
    // All devices currently known to the fabric.
    fn devices(&self) -> Vec<DeviceId>;

    // Links incident to the given device, in either direction.
    fn links_of(&self, device: DeviceId) -> Vec<Link>;

    // Whether this controller instance is the master of the device.
    fn is_local_master(&self, device: DeviceId) -> bool;
}

// ===== impl DeviceId =====

impl DeviceId {
    pub const fn new(dpid: u64) -> DeviceId {
        DeviceId(dpid)
    }

    pub const fn dpid(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "of:{:016x}", self.0)
    }
}

// ===== impl PortId =====

impl PortId {
    pub const fn new(port: u32) -> PortId {
        PortId(port)
    }
}

impl std::fmt::Display for PortId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ===== impl ConnectPoint =====

impl std::fmt::Display for ConnectPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.device, self.port)
    }
}

// ===== impl Link =====

impl Link {
    // The device endpoints, ignoring ports.
    pub fn devices(&self) -> (DeviceId, DeviceId) {
        (self.src.device, self.dst.device)
    }

    // Whether the link connects the given device pair, in either direction.
    pub fn joins(&self, a: DeviceId, b: DeviceId) -> bool {
        (self.src.device == a && self.dst.device == b)
            || (self.src.device == b && self.dst.device == a)
    }

    // The device on the far side of the link, when the given device is one
    // of its endpoints.
    pub fn peer_of(&self, device: DeviceId) -> Option<DeviceId> {
        if self.src.device == device {
            Some(self.dst.device)
        } else if self.dst.device == device {
            Some(self.src.device)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.src, self.dst)
    }
}
