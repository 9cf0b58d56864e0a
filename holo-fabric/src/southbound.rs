//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeSet;
use std::net::IpAddr;

use derive_new::new;
use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};

use crate::fabric::{DeviceId, PortId};

// Kinds of forwarding rules driven through the rule writer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum RuleKind {
    IpSubnet,
    IpRouter,
    Mpls,
}

// Summary of one pass over a device's ports while applying filtering
// rules. Used as the stabilization signal for the filter retry task.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, new)]
#[derive(Deserialize, Serialize)]
pub struct PortFilterInfo {
    pub disabled_ports: u32,
    pub error_ports: u32,
    pub filtered_ports: u32,
}

// Writer of flow, group and filtering rules on fabric switches.
//
// Installation calls return whether the hardware accepted the rule.
// Implementations must be thread-safe per device: the filter retry tasks
// run concurrently with population cycles. They must never call back into
// the routing instance.
pub trait RulePopulator: Send + Sync {
    // Install an IP rule at `target` forwarding the given subnets toward
    // `dest` via the next-hop set.
    fn populate_ip_rule_for_subnet(
        &self,
        target: DeviceId,
        subnets: &BTreeSet<IpNetwork>,
        dest: DeviceId,
        next_hops: &BTreeSet<DeviceId>,
    ) -> bool;

    // Install an IP rule at `target` forwarding the router-IP host prefix
    // of `dest` via the next-hop set.
    fn populate_ip_rule_for_router(
        &self,
        target: DeviceId,
        prefix: IpNetwork,
        dest: DeviceId,
        next_hops: &BTreeSet<DeviceId>,
    ) -> bool;

    // Install the MPLS-SR rule at `target` switching the node segment of
    // `dest` (encoded from its router IP) via the next-hop set.
    fn populate_mpls_rule(
        &self,
        target: DeviceId,
        dest: DeviceId,
        next_hops: &BTreeSet<DeviceId>,
        router_ip: IpAddr,
    ) -> bool;

    // Remove the IP rules previously installed for the given subnets.
    fn revoke_ip_rule_for_subnet(&self, subnets: &BTreeSet<IpNetwork>) -> bool;

    // Install punt rules for the device's gateway and loopback IPs.
    fn populate_router_ip_punts(&self, device: DeviceId);

    // Install punt rules for ARP and NDP traffic on the device.
    fn populate_arp_ndp_punts(&self, device: DeviceId);

    // Apply MAC/VLAN filtering rules to every port of the device. Returns
    // `None` when the port inventory for the device is not available yet.
    fn populate_router_mac_vlan_filters(
        &self,
        device: DeviceId,
    ) -> Option<PortFilterInfo>;

    // Apply filtering rules to a single port that came up.
    fn populate_single_port_filters(&self, device: DeviceId, port: PortId);

    // Remove filtering rules from a single port that went down.
    fn revoke_single_port_filters(&self, device: DeviceId, port: PortId);

    // Reset the advisory rule counter.
    fn reset_counter(&self);

    // Number of rules pushed since the last reset.
    fn counter(&self) -> u64;
}

// ===== impl RuleKind =====

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleKind::IpSubnet => write!(f, "IP subnet"),
            RuleKind::IpRouter => write!(f, "IP router"),
            RuleKind::Mpls => write!(f, "MPLS"),
        }
    }
}

// ===== impl PortFilterInfo =====

impl std::fmt::Display for PortFilterInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "disabled={} errors={} filtered={}",
            self.disabled_ports, self.error_ports, self.filtered_ports
        )
    }
}
