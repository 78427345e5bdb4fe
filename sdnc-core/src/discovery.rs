//
// Copyright (c) The sdnc Contributors
//
// SPDX-License-Identifier: MIT
//

//! The Discovery Engine (DE): periodic LLDP probing, link bookkeeping, and
//! the teardown paths that keep the Topology Graph consistent with live
//! switch state (spec.md §4.3).
//!
//! This is the one component consolidating the "most complete" variant
//! named in spec.md §9: LLDP emission and ingestion, the periodic link
//! collector, PortStatus-driven teardown, and ConnectionDown-driven
//! teardown all live here, rather than splitting across the several
//! partial iterations `examples/original_source/discovery.py` shows.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;

use sdnc_southbound::{
    ConnectionHandle, FlowMatch, FlowModCommand, OutputAction, PortConfig,
    PortDesc, SouthboundHandler, SouthboundMsg, CONTROLLER_PORT,
};
use sdnc_utils::task::IntervalTask;
use sdnc_utils::{ControllerConfig, Dpid, MacAddr};

use crate::conn_registry::ConnectionRegistry;
use crate::debug::Debug;
use crate::hlt::HostLocationTable;
use crate::packet::ethernet::{EthernetFrame, ETHERTYPE_ARP, ETHERTYPE_LLDP};
use crate::packet::lldp::LldpPacket;
use crate::topology::Topology;

/// Discovery-specific failure domain (SPEC_FULL.md §7).
#[derive(Debug)]
pub enum Error {
    MalformedLldp(crate::packet::DecodeError),
    MalformedArp(crate::packet::DecodeError),
    SendFailed(sdnc_southbound::SendError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MalformedLldp(err) => write!(f, "malformed LLDP: {err}"),
            Error::MalformedArp(err) => write!(f, "malformed ARP: {err}"),
            Error::SendFailed(err) => {
                write!(f, "southbound send failed: {err}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn log(&self) {
        match self {
            Error::MalformedLldp(_) | Error::MalformedArp(_) => {
                tracing::debug!("{self}");
            }
            Error::SendFailed(_) => {
                tracing::warn!("{self}");
            }
        }
    }
}

struct SwitchState {
    ports: Vec<PortDesc>,
}

/// The Discovery Engine. One instance is constructed per controller
/// process and registered with the southbound dispatcher.
pub struct Discovery {
    config: Arc<ControllerConfig>,
    topology: Arc<RwLock<Topology>>,
    hlt: Arc<Mutex<HostLocationTable>>,
    connections: Arc<ConnectionRegistry>,
    switches: Arc<Mutex<HashMap<Dpid, SwitchState>>>,
    lldp_timers: Mutex<HashMap<Dpid, IntervalTask>>,
    _link_collector: IntervalTask,
}

impl Discovery {
    pub fn new(
        config: Arc<ControllerConfig>,
        topology: Arc<RwLock<Topology>>,
        hlt: Arc<Mutex<HostLocationTable>>,
        connections: Arc<ConnectionRegistry>,
    ) -> Discovery {
        let link_collector = {
            let config = config.clone();
            let topology = topology.clone();
            IntervalTask::new(config.link_collector_period(), false, move || {
                let config = config.clone();
                let topology = topology.clone();
                async move { run_link_collector(&config, &topology) }
            })
        };

        Discovery {
            config,
            topology,
            hlt,
            connections,
            switches: Arc::new(Mutex::new(HashMap::new())),
            lldp_timers: Mutex::new(HashMap::new()),
            _link_collector: link_collector,
        }
    }

    /// Arms the per-switch LLDP-emit timer if `dpid` isn't already in the
    /// scheduled-switches set (invariant S1). A duplicate ConnectionUp for
    /// an already-scheduled dpid leaves the existing timer intact (spec.md
    /// §4.3 failure semantics).
    fn schedule_lldp_emit(&self, dpid: Dpid) {
        let mut timers = self.lldp_timers.lock().unwrap();
        if timers.contains_key(&dpid) {
            return;
        }

        let config = self.config.clone();
        let switches = self.switches.clone();
        let connections = self.connections.clone();
        let timer =
            IntervalTask::new(config.lldp_ttl(), false, move || {
                let config = config.clone();
                let switches = switches.clone();
                let connections = connections.clone();
                async move { emit_lldp(dpid, &config, &switches, &connections) }
            });
        timers.insert(dpid, timer);
    }

    /// Cancels `dpid`'s LLDP-emit timer by dropping its handle, and drops
    /// it from the scheduled-switches set in the same step.
    fn cancel_lldp_emit(&self, dpid: Dpid) {
        self.lldp_timers.lock().unwrap().remove(&dpid);
    }

    fn handle_lldp(&self, local_dpid: Dpid, in_port: u16, payload: &[u8]) {
        let lldp = match LldpPacket::decode(payload) {
            Ok(lldp) => lldp,
            Err(err) => {
                Error::MalformedLldp(err).log();
                return;
            }
        };

        let remote_dpid = Dpid(lldp.chassis_dpid);
        let remote_port = lldp.port_id as u16;
        let now = Instant::now();

        let mut topology = self.topology.write().unwrap();
        topology.add_node(remote_dpid);
        topology.add_node(local_dpid);
        topology.add_or_refresh_edge(local_dpid, remote_dpid, now);
        topology.record_port_use(local_dpid, in_port, remote_dpid);
        drop(topology);

        Debug::LinkUp(local_dpid, in_port, remote_dpid, remote_port).log();
    }

    fn handle_arp(&self, dpid: Dpid, in_port: u16, payload: &[u8]) {
        let arp = match crate::packet::arp::ArpPacket::decode(payload) {
            Ok(arp) => arp,
            Err(err) => {
                Error::MalformedArp(err).log();
                return;
            }
        };

        self.hlt.lock().unwrap().observe(
            dpid,
            in_port,
            arp.sender_mac,
            arp.sender_ip,
        );
    }
}

#[async_trait]
impl SouthboundHandler for Discovery {
    fn name(&self) -> &'static str {
        "discovery"
    }

    async fn on_connection_up(
        &self,
        dpid: Dpid,
        ports: &[PortDesc],
        conn: &ConnectionHandle,
    ) {
        self.topology.write().unwrap().add_node(dpid);

        self.connections.insert(dpid, conn.clone());
        self.switches.lock().unwrap().insert(
            dpid,
            SwitchState {
                ports: ports.to_vec(),
            },
        );

        for msg in [
            SouthboundMsg::FlowMod {
                match_: FlowMatch::Lldp,
                actions: vec![OutputAction {
                    port: CONTROLLER_PORT,
                }],
                idle_timeout: None,
                command: FlowModCommand::Add,
            },
            SouthboundMsg::FlowMod {
                match_: FlowMatch::ArpBroadcast,
                actions: vec![OutputAction {
                    port: CONTROLLER_PORT,
                }],
                idle_timeout: None,
                command: FlowModCommand::Add,
            },
        ] {
            if let Err(err) = conn.send(msg) {
                Error::SendFailed(err).log();
            }
        }

        Debug::SwitchAdded(dpid).log();
        self.schedule_lldp_emit(dpid);
    }

    async fn on_connection_down(&self, dpid: Dpid) {
        // `remove_node` already deletes every incident edge (both `link_to`
        // sides and the edge itself) before dropping the node, matching
        // spec.md §4.3.5's "for every neighbor... delete_edge; then
        // remove_node" in one call.
        self.topology.write().unwrap().remove_node(dpid);

        self.connections.remove(dpid);
        self.switches.lock().unwrap().remove(&dpid);
        self.cancel_lldp_emit(dpid);

        Debug::SwitchRemoved(dpid).log();
    }

    async fn on_port_status(
        &self,
        dpid: Dpid,
        port: u16,
        config: PortConfig,
    ) {
        if !config.down {
            // Reaction to "up" is undefined in the original; LLDP probes
            // re-establish the link naturally (spec.md §9 open questions).
            return;
        }

        let neighbor = {
            let topology = self.topology.read().unwrap();
            topology.remote_endpoint(dpid, port).map(|(n, _)| n)
        };

        if let Some(neighbor) = neighbor {
            self.topology.write().unwrap().delete_edge(dpid, neighbor);
            Debug::LinkDown(dpid, neighbor).log();
        }
    }

    async fn on_packet_in(
        &self,
        dpid: Dpid,
        in_port: u16,
        data: &[u8],
        _conn: &ConnectionHandle,
    ) {
        let frame = match EthernetFrame::decode(data) {
            Ok(frame) => frame,
            Err(_) => return,
        };

        match frame.ethertype {
            ETHERTYPE_LLDP => self.handle_lldp(dpid, in_port, &frame.payload),
            ETHERTYPE_ARP => self.handle_arp(dpid, in_port, &frame.payload),
            _ => {}
        }
    }
}

fn emit_lldp(
    dpid: Dpid,
    config: &ControllerConfig,
    switches: &Mutex<HashMap<Dpid, SwitchState>>,
    connections: &ConnectionRegistry,
) {
    let switches = switches.lock().unwrap();
    let Some(state) = switches.get(&dpid) else {
        return;
    };
    let Some(conn) = connections.get(dpid) else {
        return;
    };

    let lldp = LldpPacket {
        chassis_dpid: dpid.0,
        port_id: 0,
        ttl_secs: config.lldp_ttl_secs as u16,
    };

    for port in &state.ports {
        if port.port_no >= config.max_physical_port {
            continue;
        }

        let frame = EthernetFrame {
            dst: MacAddr::LLDP_MULTICAST,
            src: MacAddr::from(port.hw_addr),
            ethertype: ETHERTYPE_LLDP,
            payload: Bytes::from(
                LldpPacket {
                    port_id: port.port_no as u32,
                    ..lldp
                }
                .encode(),
            ),
        };

        let msg = SouthboundMsg::PacketOut {
            data: Bytes::from(frame.encode()),
            actions: vec![OutputAction {
                port: port.port_no,
            }],
        };

        if let Err(err) = conn.send(msg) {
            Error::SendFailed(err).log();
            continue;
        }
        Debug::LldpEmit(dpid, port.port_no).log();
    }
}

fn run_link_collector(config: &ControllerConfig, topology: &RwLock<Topology>) {
    let staleness = config.link_staleness();
    let now = Instant::now();

    let snapshot = topology.read().unwrap().edge_snapshot();
    let mut expired = 0;
    for (a, b, timestamp) in snapshot {
        if now.duration_since(timestamp) > staleness {
            topology.write().unwrap().delete_edge(a, b);
            expired += 1;
        }
    }

    if expired > 0 {
        Debug::LinkCollectorSweep(expired).log();
    }
}
