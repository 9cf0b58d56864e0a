//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::DeviceConfig;
use crate::debug::Debug;
use crate::error::Error;
use crate::fabric::{ConnectPoint, DeviceId, FabricView, Link, PortId};
use crate::output;
use crate::route::{self, RouteChange};
use crate::southbound::{RuleKind, RulePopulator};
use crate::spf::EcmpGraph;
use crate::tasks::{self, Task};

// Progress of the routing rule population process.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum PopulationStatus {
    // Population has not started yet.
    #[default]
    Idle,
    // Population is in progress.
    Started,
    // Population finished successfully.
    Succeeded,
    // Population was aborted on a rule or configuration failure.
    Aborted,
}

// Default routing handler instance.
//
// Computes the ECMP shortest-path graphs of the fabric and drives the
// rule writer so that every locally-mastered switch forwards toward
// every destination, reacting incrementally to topology changes where
// the stored snapshots allow it.
pub struct Instance {
    pub(crate) fabric: Arc<dyn FabricView>,
    pub(crate) config: Arc<dyn DeviceConfig>,
    pub(crate) populator: Arc<dyn RulePopulator>,
    // Population status, ECMP snapshots and retry tasks, serialized
    // under a single lock.
    state: Mutex<InstanceState>,
}

#[derive(Default)]
struct InstanceState {
    status: PopulationStatus,
    // Graphs backing the last successful program of each root.
    current: BTreeMap<DeviceId, EcmpGraph>,
    // Scratch snapshot taken at the start of a link-change cycle.
    updated: BTreeMap<DeviceId, EcmpGraph>,
    // Per-device port filter retry tasks.
    filter_retries: BTreeMap<DeviceId, Task<()>>,
}

// ===== impl Instance =====

impl Instance {
    pub fn new(
        fabric: Arc<dyn FabricView>,
        config: Arc<dyn DeviceConfig>,
        populator: Arc<dyn RulePopulator>,
    ) -> Instance {
        Debug::InstanceCreate.log();
        Instance {
            fabric,
            config,
            populator,
            state: Mutex::new(InstanceState::default()),
        }
    }

    // Diagnostic read of the population status.
    pub fn status(&self) -> PopulationStatus {
        self.state.lock().unwrap().status
    }

    // Populates the routing rules of every locally-mastered device
    // toward every destination, from freshly computed ECMP graphs.
    pub fn populate_all_routing_rules(&self) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        self.populate_all(&mut state)
    }

    // Repopulates the rules affected by a link status change. With a
    // failed link the stored graphs alone determine the damage;
    // otherwise a fresh snapshot is diffed against them. When the
    // incremental computation is unsound the whole fabric is
    // reprogrammed. A switch removal takes all of its links down at
    // once but arrives as a single event with no failed link.
    pub fn populate_routing_rules_for_link_status_change(
        &self,
        failed_link: Option<&Link>,
    ) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();

        if state.status == PopulationStatus::Started {
            warn!("previous rule population is not finished");
            return Ok(());
        }

        // Snapshot the topology as seen from every locally-mastered
        // root.
        state.updated.clear();
        for device in self.fabric.devices() {
            if !self.fabric.is_local_master(device) {
                continue;
            }
            let graph = EcmpGraph::new(device, &*self.fabric);
            state.updated.insert(device, graph);
        }

        Debug::LinkCycleStart(failed_link).log();
        state.status = PopulationStatus::Started;
        Debug::PopulationStatus(state.status).log();

        let routes = match failed_link {
            None => Ok(route::changed_routes(
                &*self.fabric,
                &state.current,
                &state.updated,
            )),
            Some(link) => {
                route::damaged_routes(&*self.fabric, &state.current, link)
            }
        };
        let routes = match routes {
            Ok(routes) => routes,
            Err(error) => {
                // Incremental rerouting needs a full set of stored
                // graphs; fall back to reprogramming everything.
                error.log();
                return self.populate_all(&mut state);
            }
        };

        if routes.is_empty() {
            Debug::NoRouteChanges.log();
            state.status = PopulationStatus::Succeeded;
            Debug::PopulationStatus(state.status).log();
            return Ok(());
        }
        Debug::RouteChanges(&routes).log();

        match self.repopulate_routes(&mut state, routes) {
            Ok(()) => {
                state.status = PopulationStatus::Succeeded;
                Debug::PopulationStatus(state.status).log();
                Debug::PopulationComplete(self.populator.counter()).log();
                Ok(())
            }
            Err(error) => {
                error.log();
                state.status = PopulationStatus::Aborted;
                Debug::PopulationStatus(state.status).log();
                Err(error)
            }
        }
    }

    // Starts the population process unless one is already running.
    pub fn start_population_process(&self) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        match state.status {
            PopulationStatus::Idle
            | PopulationStatus::Succeeded
            | PopulationStatus::Aborted => self.populate_all(&mut state),
            PopulationStatus::Started => {
                warn!(
                    status = ?state.status,
                    "not initiating population process"
                );
                Ok(())
            }
        }
    }

    // Resumes an aborted population process, from scratch.
    pub fn resume_population_process(&self) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        match state.status {
            PopulationStatus::Aborted => self.populate_all(&mut state),
            _ => Ok(()),
        }
    }

    // Populates the rules of the given subnets at their attachment
    // point, using the stored graph of the device.
    pub fn populate_subnet(
        &self,
        cp: &ConnectPoint,
        subnets: &BTreeSet<IpNetwork>,
    ) -> Result<(), Error> {
        let state = self.state.lock().unwrap();
        Debug::SubnetPopulate(cp.device, subnets).log();
        let Some(graph) = state.current.get(&cp.device) else {
            let error = Error::GraphMissing(cp.device);
            error.log();
            return Err(error);
        };
        match output::populate_ecmp_rules(self, cp.device, graph, subnets)
        {
            Ok(()) => Ok(()),
            Err(error) => {
                error.log();
                Err(error)
            }
        }
    }

    // Revokes the rules of the given subnets everywhere.
    pub fn revoke_subnet(
        &self,
        subnets: &BTreeSet<IpNetwork>,
    ) -> Result<(), Error> {
        let _state = self.state.lock().unwrap();
        Debug::SubnetRevoke(subnets).log();
        if !self.populator.revoke_ip_rule_for_subnet(subnets) {
            return Err(Error::RuleRevoke(RuleKind::IpSubnet));
        }
        Ok(())
    }

    // Drops the stored graphs of a removed device and reroutes the
    // remaining fabric around it.
    pub fn purge_ecmp_graph(&self, device: DeviceId) -> Result<(), Error> {
        {
            let mut state = self.state.lock().unwrap();
            Debug::GraphPurge(device).log();
            state.current.remove(&device);
            state.updated.remove(&device);
        }
        self.populate_routing_rules_for_link_status_change(None)
    }

    // Installs punt and port filtering rules for a device. The port
    // inventory can lag the device add and report no ports, which would
    // leave filtering rules missing; filter application keeps retrying
    // in the background until its result stabilizes. Must only be
    // called by the master instance for the device.
    pub fn populate_port_addressing_rules(&self, device: DeviceId) {
        self.populator.populate_router_ip_punts(device);
        self.populator.populate_arp_ndp_punts(device);

        let first_run = self
            .populator
            .populate_router_mac_vlan_filters(device)
            .unwrap_or_default();
        let task =
            tasks::filter_retry(self.populator.clone(), device, first_run);
        let mut state = self.state.lock().unwrap();
        // Replacing a previous retry task for the device aborts it.
        state.filter_retries.insert(device, task);
    }

    // Installs filtering rules for a port that has been enabled. Must
    // only be called by the master instance for the device.
    pub fn populate_single_port_filters(
        &self,
        device: DeviceId,
        port: PortId,
    ) {
        self.populator.populate_single_port_filters(device, port);
    }

    // Revokes filtering rules for a port that has been disabled. Must
    // only be called by the master instance for the device.
    pub fn revoke_single_port_filters(
        &self,
        device: DeviceId,
        port: PortId,
    ) {
        self.populator.revoke_single_port_filters(device, port);
    }

    // ===== internal population cycle =====

    fn populate_all(
        &self,
        state: &mut InstanceState,
    ) -> Result<(), Error> {
        state.status = PopulationStatus::Started;
        Debug::PopulationStatus(state.status).log();
        self.populator.reset_counter();
        Debug::PopulationStart.log();

        for device in self.fabric.devices() {
            if !self.fabric.is_local_master(device) {
                Debug::DeviceNotMaster(device).log();
                continue;
            }
            let graph = EcmpGraph::new(device, &*self.fabric);
            if let Err(error) = output::populate_ecmp_rules(
                self,
                device,
                &graph,
                &BTreeSet::new(),
            ) {
                error.log();
                state.status = PopulationStatus::Aborted;
                Debug::PopulationStatus(state.status).log();
                return Err(error);
            }
            state.current.insert(device, graph);
        }

        state.status = PopulationStatus::Succeeded;
        Debug::PopulationStatus(state.status).log();
        Debug::PopulationComplete(self.populator.counter()).log();
        Ok(())
    }

    // Repopulates the given route scopes. The stored graph of an
    // impacted destination is refreshed only after every route toward
    // it succeeded; on a partial failure the stale graph keeps the next
    // diff honest. A destination whose target has left the fabric still
    // gets its graph refreshed, with no rules pushed.
    fn repopulate_routes(
        &self,
        state: &mut InstanceState,
        routes: BTreeSet<RouteChange>,
    ) -> Result<(), Error> {
        self.populator.reset_counter();

        let mut routes_by_dest: BTreeMap<DeviceId, Vec<DeviceId>> =
            BTreeMap::new();
        for route in routes {
            match route {
                RouteChange::AllToDest(dest) => {
                    // Reinstall from every target toward this root.
                    let graph = EcmpGraph::new(dest, &*self.fabric);
                    output::populate_ecmp_rules(
                        self,
                        dest,
                        &graph,
                        &BTreeSet::new(),
                    )?;
                    state.current.insert(dest, graph);
                }
                RouteChange::TargetToDest(target, dest) => {
                    routes_by_dest.entry(dest).or_default().push(target);
                }
            }
        }

        for (dest, targets) in routes_by_dest {
            for target in targets {
                Debug::RouteRepopulate(target, dest).log();
                let graph = state
                    .updated
                    .get(&dest)
                    .ok_or(Error::GraphMissing(dest))?;
                let Some(via) = graph.via_for_target(target) else {
                    continue;
                };
                let next_hops = graph.next_hops_of(via);
                output::populate_partial(
                    self,
                    target,
                    dest,
                    next_hops,
                    &BTreeSet::new(),
                )?;
            }
            if let Some(graph) = state.updated.get(&dest).cloned() {
                state.current.insert(dest, graph);
            }
        }
        Ok(())
    }
}
