//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::debug::Debug;
use crate::error::Error;
use crate::fabric::{DeviceId, FabricView, Link};
use crate::spf::{EcmpGraph, PathIdx};

// Scope of a route re-install produced by snapshot diffing.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum RouteChange {
    // Reinstall the routes of every target toward the destination.
    AllToDest(DeviceId),
    // Reinstall the route of one target toward the destination.
    TargetToDest(DeviceId, DeviceId),
}

// ===== global functions =====

// Computes the routes damaged by a failed link, using only the stored
// graphs. A locally-mastered device without a stored graph makes the
// incremental computation unsound and fails with `SnapshotStale`, which
// the caller escalates to a full reprogram.
pub fn damaged_routes(
    fabric: &dyn FabricView,
    current: &BTreeMap<DeviceId, EcmpGraph>,
    failed_link: &Link,
) -> Result<BTreeSet<RouteChange>, Error> {
    let mut routes = BTreeSet::new();

    for root in fabric.devices() {
        if !fabric.is_local_master(root) {
            Debug::DeviceNotMaster(root).log();
            continue;
        }
        let graph =
            current.get(&root).ok_or(Error::SnapshotStale(root))?;
        for (_, target, via) in graph.entries() {
            if path_links(graph, target, via)
                .iter()
                .any(|&(a, b)| failed_link.joins(a, b))
            {
                Debug::RouteImpacted(target, root).log();
                routes.insert(RouteChange::TargetToDest(target, root));
            }
        }
    }

    Ok(routes)
}

// Computes the routes changed between the stored graphs and a fresh
// snapshot, covering new links as well as removed links and devices.
pub fn changed_routes(
    fabric: &dyn FabricView,
    current: &BTreeMap<DeviceId, EcmpGraph>,
    updated: &BTreeMap<DeviceId, EcmpGraph>,
) -> BTreeSet<RouteChange> {
    let mut routes = BTreeSet::new();

    for root in fabric.devices() {
        if !fabric.is_local_master(root) {
            Debug::DeviceNotMaster(root).log();
            continue;
        }
        let Some(curr) = current.get(&root) else {
            // Never programmed toward this root before.
            routes.insert(RouteChange::AllToDest(root));
            continue;
        };
        let Some(updt) = updated.get(&root) else {
            continue;
        };
        // New links only show up in the updated graph; removed links and
        // devices only in the current one.
        compare_graphs(updt, curr, root, &mut routes);
        compare_graphs(curr, updt, root, &mut routes);
    }

    routes
}

// ===== helper functions =====

// Emits a route change for every target reachable in `base` whose ECMP
// via-set is absent from, or different in, `comp`.
fn compare_graphs(
    base: &EcmpGraph,
    comp: &EcmpGraph,
    root: DeviceId,
    routes: &mut BTreeSet<RouteChange>,
) {
    for (_, target, via) in base.entries() {
        let changed = match comp.via_for_target(target) {
            Some(comp_via) => {
                base.sorted_vias(via) != comp.sorted_vias(comp_via)
            }
            None => true,
        };
        if changed {
            Debug::RouteImpacted(target, root).log();
            routes.insert(RouteChange::TargetToDest(target, root));
        }
    }
}

// Expands the via-paths of a target into their constituent device pairs,
// from the target through the intermediates to the root.
fn path_links(
    graph: &EcmpGraph,
    target: DeviceId,
    via: &[PathIdx],
) -> BTreeSet<(DeviceId, DeviceId)> {
    let mut links = BTreeSet::new();
    for &idx in via {
        let mut src = target;
        for &hop in graph.resolve(idx) {
            links.insert((src, hop));
            src = hop;
        }
        links.insert((src, graph.root()));
    }
    links
}

// ===== impl RouteChange =====

impl std::fmt::Display for RouteChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteChange::AllToDest(dest) => {
                write!(f, "all -> {dest}")
            }
            RouteChange::TargetToDest(target, dest) => {
                write!(f, "{target} -> {dest}")
            }
        }
    }
}
