//
// Copyright (c) The sdnc Contributors
//
// SPDX-License-Identifier: MIT
//

//! The three subsystems that make up the controller core: the Topology
//! Graph, the Host Location Table, the Discovery Engine, the ARP
//! Responder, and the Reactive Router (spec.md §2).
//!
//! [`Controller`] owns the shared state and wires the southbound-facing
//! components into a [`Dispatcher`] in the order spec.md §2 requires: "SA
//! dispatches events to DE, AR, RR in that registration order".

#![warn(rust_2018_idioms)]

pub mod arp_responder;
pub mod conn_registry;
pub mod debug;
pub mod discovery;
pub mod hlt;
pub mod packet;
pub mod router;
pub mod topology;

use std::sync::{Arc, Mutex, RwLock};

use sdnc_southbound::Dispatcher;
use sdnc_utils::ControllerConfig;

use arp_responder::ArpResponder;
use conn_registry::ConnectionRegistry;
use discovery::Discovery;
use hlt::HostLocationTable;
use router::Router;
use topology::Topology;

/// Read-only snapshot of controller state, intended for a future
/// northbound/gRPC layer (SPEC_FULL.md §4.6). No transport is implemented
/// here — only the accessor.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize)]
pub struct Snapshot {
    pub switch_count: usize,
    pub link_count: usize,
    pub host_count: usize,
}

/// Owns the Topology Graph and Host Location Table singletons and builds
/// the dispatcher that fans southbound events out to the Discovery
/// Engine, ARP Responder, and Reactive Router.
pub struct Controller {
    config: Arc<ControllerConfig>,
    topology: Arc<RwLock<Topology>>,
    hlt: Arc<Mutex<HostLocationTable>>,
    connections: Arc<ConnectionRegistry>,
}

impl Controller {
    pub fn new(config: ControllerConfig) -> Controller {
        let config = Arc::new(config);
        let hlt = Arc::new(Mutex::new(HostLocationTable::new(
            config.host_max_age(),
        )));
        Controller {
            config,
            topology: Arc::new(RwLock::new(Topology::new())),
            hlt,
            connections: Arc::new(ConnectionRegistry::new()),
        }
    }

    pub fn topology(&self) -> &Arc<RwLock<Topology>> {
        &self.topology
    }

    pub fn hlt(&self) -> &Arc<Mutex<HostLocationTable>> {
        &self.hlt
    }

    pub fn config(&self) -> &Arc<ControllerConfig> {
        &self.config
    }

    /// Bulk-loads static host entries at startup (spec.md §6 `HLT_SEED`).
    pub fn seed_hosts(&self, records: impl IntoIterator<Item = hlt::HostRecord>) {
        self.hlt.lock().unwrap().seed(records);
    }

    /// Builds the dispatcher with DE, AR, RR registered in that order
    /// (spec.md §2). This is the only bootstrap entry point the core
    /// exposes; the surrounding controller shell (`sdnc-daemon`) owns
    /// feeding it southbound events.
    pub fn register(&self) -> Dispatcher {
        let mut dispatcher = Dispatcher::new();

        dispatcher.register(Box::new(Discovery::new(
            self.config.clone(),
            self.topology.clone(),
            self.hlt.clone(),
            self.connections.clone(),
        )));
        dispatcher.register(Box::new(ArpResponder::new(self.config.clone())));
        dispatcher.register(Box::new(Router::new(
            self.config.clone(),
            self.topology.clone(),
            self.hlt.clone(),
            self.connections.clone(),
        )));

        dispatcher
    }

    pub fn snapshot(&self) -> Snapshot {
        let topology = self.topology.read().unwrap();
        Snapshot {
            switch_count: topology.node_count(),
            link_count: topology.edge_count(),
            host_count: self.hlt.lock().unwrap().len(),
        }
    }
}
