//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeSet;

use ipnetwork::IpNetwork;

use crate::debug::Debug;
use crate::error::Error;
use crate::fabric::{ConnectPoint, DeviceId, Link, PortId};
use crate::instance::Instance;

// ===== controller events =====

// A device joined the fabric. Punt and filtering rules are applied right
// away; routes toward it follow from the link events.
pub fn process_device_added(instance: &Instance, device: DeviceId) {
    instance.populate_port_addressing_rules(device);
}

// A device left the fabric, taking all of its links with it.
pub fn process_device_removed(
    instance: &Instance,
    device: DeviceId,
) -> Result<(), Error> {
    instance.purge_ecmp_graph(device)
}

// A link came up somewhere in the fabric.
pub fn process_link_added(instance: &Instance) -> Result<(), Error> {
    instance.populate_routing_rules_for_link_status_change(None)
}

// A single link failed.
pub fn process_link_failed(
    instance: &Instance,
    link: &Link,
) -> Result<(), Error> {
    instance.populate_routing_rules_for_link_status_change(Some(link))
}

// A port came up on a locally-mastered device.
pub fn process_port_enabled(
    instance: &Instance,
    device: DeviceId,
    port: PortId,
) {
    instance.populate_single_port_filters(device, port);
}

// A port went down on a locally-mastered device.
pub fn process_port_disabled(
    instance: &Instance,
    device: DeviceId,
    port: PortId,
) {
    instance.revoke_single_port_filters(device, port);
}

// Subnets were attached at the given connect point.
pub fn process_subnet_added(
    instance: &Instance,
    cp: &ConnectPoint,
    subnets: &BTreeSet<IpNetwork>,
) -> Result<(), Error> {
    instance.populate_subnet(cp, subnets)
}

// Subnets were detached from the fabric.
pub fn process_subnet_removed(
    instance: &Instance,
    subnets: &BTreeSet<IpNetwork>,
) -> Result<(), Error> {
    instance.revoke_subnet(subnets)
}

// Mastership of a device moved; the set of roots this controller
// programs changed with it.
pub fn process_master_changed(
    instance: &Instance,
    device: DeviceId,
) -> Result<(), Error> {
    Debug::MasterChange(device).log();
    instance.populate_routing_rules_for_link_status_change(None)
}

// Administrative request to reroute the whole network (the
// `sr-reroute-network` command).
pub fn process_reroute_request(instance: &Instance) -> Result<(), Error> {
    instance.start_population_process()
}
