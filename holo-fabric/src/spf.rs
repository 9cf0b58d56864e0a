//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::fabric::{DeviceId, FabricView};

// Ordered intermediate devices on one ECMP branch from a target to the
// root, nearest to the target first, excluding both endpoints.
pub type ViaPath = Vec<DeviceId>;

// Index into the via-path arena of an `EcmpGraph`.
pub type PathIdx = usize;

// Equal-cost shortest-path graph rooted at one destination device.
//
// Holds every device reachable from the root, indexed by hop distance,
// together with all of its minimum-hop via-paths. Immutable once built:
// population cycles snapshot the fabric by building fresh graphs and
// diffing them against the stored ones.
#[derive(Clone, Debug)]
#[derive(Deserialize, Serialize)]
pub struct EcmpGraph {
    root: DeviceId,
    // Arena of via-paths referenced from the depth buckets.
    paths: Vec<ViaPath>,
    // Reached devices indexed by hop distance from the root.
    via_by_depth: BTreeMap<u16, BTreeMap<DeviceId, Vec<PathIdx>>>,
}

// ===== impl EcmpGraph =====

impl EcmpGraph {
    // Arena slot of the empty via-path shared by the root and its direct
    // neighbors.
    const DIRECT: PathIdx = 0;

    // Builds the graph by breadth-first expansion from the root over the
    // fabric's links, in both directions. Every minimum-hop predecessor
    // of a device contributes its via-paths, which yields the full ECMP
    // set. Mastership is not consulted here.
    pub fn new(root: DeviceId, fabric: &dyn FabricView) -> EcmpGraph {
        let mut paths = vec![ViaPath::new()];
        let mut via_by_depth = BTreeMap::new();

        let mut frontier =
            BTreeMap::from([(root, vec![Self::DIRECT])]);
        via_by_depth.insert(0, frontier.clone());
        let mut settled = BTreeSet::from([root]);
        let mut depth: u16 = 0;

        while !frontier.is_empty() {
            depth += 1;
            let mut reached: BTreeMap<DeviceId, Vec<PathIdx>> =
                BTreeMap::new();
            for (&device, device_via) in &frontier {
                for link in fabric.links_of(device) {
                    let Some(peer) = link.peer_of(device) else {
                        continue;
                    };
                    if settled.contains(&peer) {
                        continue;
                    }
                    let peer_via = reached.entry(peer).or_default();
                    if device == root {
                        if !peer_via.contains(&Self::DIRECT) {
                            peer_via.push(Self::DIRECT);
                        }
                        continue;
                    }
                    for &idx in device_via {
                        let mut path =
                            Vec::with_capacity(paths[idx].len() + 1);
                        path.push(device);
                        path.extend_from_slice(&paths[idx]);
                        // Parallel links would replay the same path.
                        if peer_via.iter().any(|&pi| paths[pi] == path) {
                            continue;
                        }
                        paths.push(path);
                        peer_via.push(paths.len() - 1);
                    }
                }
            }
            if reached.is_empty() {
                break;
            }
            settled.extend(reached.keys().copied());
            frontier = reached.clone();
            via_by_depth.insert(depth, reached);
        }

        EcmpGraph {
            root,
            paths,
            via_by_depth,
        }
    }

    pub fn root(&self) -> DeviceId {
        self.root
    }

    // All reached devices and their via-path indices, in depth order.
    pub fn entries(
        &self,
    ) -> impl Iterator<Item = (u16, DeviceId, &[PathIdx])> + '_ {
        self.via_by_depth.iter().flat_map(|(&depth, targets)| {
            targets
                .iter()
                .map(move |(&target, via)| (depth, target, via.as_slice()))
        })
    }

    // Resolves one arena index to its via-path.
    pub fn resolve(&self, idx: PathIdx) -> &ViaPath {
        &self.paths[idx]
    }

    // Via-path indices of a target, scanning the depth buckets in order.
    pub fn via_for_target(&self, target: DeviceId) -> Option<&[PathIdx]> {
        self.via_by_depth
            .values()
            .find_map(|targets| targets.get(&target))
            .map(Vec::as_slice)
    }

    // First hop of every ECMP branch; a direct branch yields the root.
    pub fn next_hops_of(&self, via: &[PathIdx]) -> BTreeSet<DeviceId> {
        via.iter()
            .map(|&idx| {
                self.paths[idx].first().copied().unwrap_or(self.root)
            })
            .collect()
    }

    // Next hops toward the root as seen from the given target.
    pub fn next_hops(&self, target: DeviceId) -> BTreeSet<DeviceId> {
        self.via_for_target(target)
            .map(|via| self.next_hops_of(via))
            .unwrap_or_default()
    }

    // Resolved via-paths in a canonical order, for order-insensitive
    // comparison of ECMP sets.
    pub(crate) fn sorted_vias(&self, via: &[PathIdx]) -> Vec<&ViaPath> {
        let mut vias =
            via.iter().map(|&idx| &self.paths[idx]).collect::<Vec<_>>();
        vias.sort();
        vias
    }
}

// Two graphs are equal when every target is reached at the same depth
// with the same set of via-paths, regardless of insertion order.
impl PartialEq for EcmpGraph {
    fn eq(&self, other: &EcmpGraph) -> bool {
        self.root == other.root
            && self.via_by_depth.len() == other.via_by_depth.len()
            && self.via_by_depth.iter().all(|(depth, targets)| {
                other.via_by_depth.get(depth).is_some_and(|other_targets| {
                    targets.len() == other_targets.len()
                        && targets.iter().all(|(target, via)| {
                            other_targets.get(target).is_some_and(
                                |other_via| {
                                    self.sorted_vias(via)
                                        == other.sorted_vias(other_via)
                                },
                            )
                        })
                })
            })
    }
}

impl Eq for EcmpGraph {}
