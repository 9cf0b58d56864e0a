//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeSet;
use std::net::IpAddr;

use ipnetwork::IpNetwork;
use tracing::debug;

use crate::fabric::{DeviceId, Link};
use crate::instance::PopulationStatus;
use crate::route::RouteChange;

// Routing handler debug messages.
#[derive(Debug)]
pub enum Debug<'a> {
    // Instance
    InstanceCreate,
    // Population lifecycle
    PopulationStart,
    PopulationStatus(PopulationStatus),
    PopulationComplete(u64),
    // Route computation
    DeviceNotMaster(DeviceId),
    LinkCycleStart(Option<&'a Link>),
    NoRouteChanges,
    RouteChanges(&'a BTreeSet<RouteChange>),
    RouteImpacted(DeviceId, DeviceId),
    RouteRepopulate(DeviceId, DeviceId),
    MasterChange(DeviceId),
    GraphPurge(DeviceId),
    // Rule population
    EcmpRulePopulate(u16, DeviceId, DeviceId),
    SubnetRulePopulate(DeviceId, DeviceId, &'a BTreeSet<IpNetwork>),
    RouterRulePopulate(DeviceId, DeviceId, &'a IpNetwork),
    MplsRulePopulate(DeviceId, DeviceId, IpAddr),
    SubnetPopulate(DeviceId, &'a BTreeSet<IpNetwork>),
    SubnetRevoke(&'a BTreeSet<IpNetwork>),
    // Port filters
    FilterRetryAttempt(DeviceId, u32),
    FilterRetryStable(DeviceId, u32),
}

// ===== impl Debug =====

impl Debug<'_> {
    // Log debug message using the tracing API.
    pub(crate) fn log(&self) {
        match self {
            Debug::InstanceCreate | Debug::PopulationStart => {
                debug!("{}", self);
            }
            Debug::PopulationStatus(status) => {
                debug!(?status, "{}", self);
            }
            Debug::PopulationComplete(rules) => {
                debug!(%rules, "{}", self);
            }
            Debug::DeviceNotMaster(device) => {
                debug!(%device, "{}", self);
            }
            Debug::LinkCycleStart(failed_link) => {
                if let Some(link) = failed_link {
                    debug!(%link, "{}", self);
                } else {
                    debug!("{}", self);
                }
            }
            Debug::NoRouteChanges => {
                debug!("{}", self);
            }
            Debug::RouteChanges(routes) => {
                debug!(count = %routes.len(), ?routes, "{}", self);
            }
            Debug::RouteImpacted(target, root)
            | Debug::RouteRepopulate(target, root) => {
                debug!(%target, %root, "{}", self);
            }
            Debug::MasterChange(device) | Debug::GraphPurge(device) => {
                debug!(%device, "{}", self);
            }
            Debug::EcmpRulePopulate(depth, target, dest) => {
                debug!(%depth, %target, %dest, "{}", self);
            }
            Debug::SubnetRulePopulate(target, dest, subnets) => {
                debug!(%target, %dest, ?subnets, "{}", self);
            }
            Debug::RouterRulePopulate(target, dest, prefix) => {
                debug!(%target, %dest, %prefix, "{}", self);
            }
            Debug::MplsRulePopulate(target, dest, router_ip) => {
                debug!(%target, %dest, %router_ip, "{}", self);
            }
            Debug::SubnetPopulate(device, subnets) => {
                debug!(%device, ?subnets, "{}", self);
            }
            Debug::SubnetRevoke(subnets) => {
                debug!(?subnets, "{}", self);
            }
            Debug::FilterRetryAttempt(device, attempt)
            | Debug::FilterRetryStable(device, attempt) => {
                debug!(%device, %attempt, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Debug<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::InstanceCreate => {
                write!(f, "instance created")
            }
            Debug::PopulationStart => {
                write!(f, "starting routing rule population")
            }
            Debug::PopulationStatus(..) => {
                write!(f, "population status change")
            }
            Debug::PopulationComplete(..) => {
                write!(f, "routing rule population completed")
            }
            Debug::DeviceNotMaster(..) => {
                write!(f, "skipping device, not the local master")
            }
            Debug::LinkCycleStart(..) => {
                write!(f, "starting rule population from link change")
            }
            Debug::NoRouteChanges => {
                write!(f, "no route changes for the link status change")
            }
            Debug::RouteChanges(..) => {
                write!(f, "routes to repopulate")
            }
            Debug::RouteImpacted(..) => {
                write!(f, "impacted route")
            }
            Debug::RouteRepopulate(..) => {
                write!(f, "repopulating route")
            }
            Debug::MasterChange(..) => {
                write!(f, "mastership change")
            }
            Debug::GraphPurge(..) => {
                write!(f, "purging ECMP graph")
            }
            Debug::EcmpRulePopulate(..) => {
                write!(f, "populating ECMP rules")
            }
            Debug::SubnetRulePopulate(..) => {
                write!(f, "populating IP rules for subnets")
            }
            Debug::RouterRulePopulate(..) => {
                write!(f, "populating IP rule for router IP")
            }
            Debug::MplsRulePopulate(..) => {
                write!(f, "populating MPLS rules")
            }
            Debug::SubnetPopulate(..) => {
                write!(f, "populating rules for added subnets")
            }
            Debug::SubnetRevoke(..) => {
                write!(f, "revoking rules for removed subnets")
            }
            Debug::FilterRetryAttempt(..) => {
                write!(f, "retrying port filters")
            }
            Debug::FilterRetryStable(..) => {
                write!(f, "port filter results stable")
            }
        }
    }
}
