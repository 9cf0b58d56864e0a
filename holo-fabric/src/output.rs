//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeSet;
use std::net::IpAddr;

use ipnetwork::IpNetwork;

use crate::debug::Debug;
use crate::error::Error;
use crate::fabric::DeviceId;
use crate::instance::Instance;
use crate::ip::{Ipv4AddrExt, Ipv6AddrExt};
use crate::southbound::RuleKind;
use crate::spf::EcmpGraph;

// ===== global functions =====

// Populates ECMP rules at every device reachable in the graph toward the
// graph's root. An empty subnet scope selects the destination's
// configured subnets. The first failed install short-circuits; retrying
// is the orchestration layer's call.
pub(crate) fn populate_ecmp_rules(
    instance: &Instance,
    dest: DeviceId,
    graph: &EcmpGraph,
    subnets: &BTreeSet<IpNetwork>,
) -> Result<(), Error> {
    for (depth, target, via) in graph.entries() {
        Debug::EcmpRulePopulate(depth, target, dest).log();
        let next_hops = graph.next_hops_of(via);
        populate_partial(instance, target, dest, next_hops, subnets)?;
    }
    Ok(())
}

// Populates the rules of a single target toward the destination via the
// given next hops.
pub(crate) fn populate_partial(
    instance: &Instance,
    target: DeviceId,
    dest: DeviceId,
    mut next_hops: BTreeSet<DeviceId>,
    subnets: &BTreeSet<IpNetwork>,
) -> Result<(), Error> {
    if next_hops.is_empty() {
        next_hops.insert(dest);
    }

    let target_is_edge = instance.config.is_edge_device(target)?;
    let dest_is_edge = instance.config.is_edge_device(dest)?;
    let dest_router_v4 = instance.config.router_ipv4(dest)?;
    let dest_router_v6 = instance.config.router_ipv6(dest);

    // Subnet rules apply between edge pairs only.
    if target_is_edge && dest_is_edge {
        let scope = if subnets.is_empty() {
            instance.config.subnets_of(dest)
        } else {
            subnets.clone()
        };
        Debug::SubnetRulePopulate(target, dest, &scope).log();
        if !instance.populator.populate_ip_rule_for_subnet(
            target, &scope, dest, &next_hops,
        ) {
            return Err(Error::RuleInstall(
                RuleKind::IpSubnet,
                target,
                dest,
            ));
        }
    }

    // Edge targets also forward to the destination's router IPs.
    if target_is_edge {
        let prefix = IpNetwork::V4(dest_router_v4.to_host_prefix());
        Debug::RouterRulePopulate(target, dest, &prefix).log();
        if !instance.populator.populate_ip_rule_for_router(
            target, prefix, dest, &next_hops,
        ) {
            return Err(Error::RuleInstall(
                RuleKind::IpRouter,
                target,
                dest,
            ));
        }
        if let Some(router_v6) = dest_router_v6 {
            let prefix = IpNetwork::V6(router_v6.to_host_prefix());
            Debug::RouterRulePopulate(target, dest, &prefix).log();
            if !instance.populator.populate_ip_rule_for_router(
                target, prefix, dest, &next_hops,
            ) {
                return Err(Error::RuleInstall(
                    RuleKind::IpRouter,
                    target,
                    dest,
                ));
            }
        }
    }

    // MPLS-SR rules are set on every pair, edge or transit.
    Debug::MplsRulePopulate(target, dest, IpAddr::V4(dest_router_v4))
        .log();
    if !instance.populator.populate_mpls_rule(
        target,
        dest,
        &next_hops,
        IpAddr::V4(dest_router_v4),
    ) {
        return Err(Error::RuleInstall(RuleKind::Mpls, target, dest));
    }
    if let Some(router_v6) = dest_router_v6 {
        Debug::MplsRulePopulate(target, dest, IpAddr::V6(router_v6))
            .log();
        if !instance.populator.populate_mpls_rule(
            target,
            dest,
            &next_hops,
            IpAddr::V6(router_v6),
        ) {
            return Err(Error::RuleInstall(RuleKind::Mpls, target, dest));
        }
    }

    Ok(())
}
