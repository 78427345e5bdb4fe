//
// Copyright (c) The sdnc Contributors
//
// SPDX-License-Identifier: MIT
//

//! The Reactive Path Router (RR): on an IPv4 packet-in, locates both
//! endpoints via the HLT, computes a shortest path across the TG, and
//! installs bidirectional forwarding flows along it (spec.md §4.5).

use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use bytes::Bytes;

use sdnc_southbound::{
    ConnectionHandle, FlowMatch, FlowModCommand, OutputAction,
    SouthboundHandler, SouthboundMsg,
};
use sdnc_utils::{ControllerConfig, Dpid};

use crate::conn_registry::ConnectionRegistry;
use crate::debug::Debug;
use crate::hlt::HostLocationTable;
use crate::packet::ethernet::{EthernetFrame, ETHERTYPE_IPV4};
use crate::packet::ipv4;
use crate::topology::Topology;

/// Routing-specific failure domain (spec.md §7, taxonomy #3: "routing
/// precondition failures... logged at error level; no flows installed").
#[derive(Debug)]
pub enum Error {
    UnknownSource(Ipv4Addr),
    UnknownDestination(Ipv4Addr),
    NoPath(Dpid, Dpid),
    MissingLinkingPorts(Dpid, Dpid),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownSource(ip) => {
                write!(f, "source {ip} not present in host location table")
            }
            Error::UnknownDestination(ip) => {
                write!(
                    f,
                    "destination {ip} not present in host location table"
                )
            }
            Error::NoPath(src, dst) => {
                write!(f, "no path from {src} to {dst}")
            }
            Error::MissingLinkingPorts(a, b) => {
                write!(f, "missing linking ports between {a} and {b}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn log(&self) {
        tracing::error!("{self}");
    }
}

/// One hop of an installed path: the switch and the local port its flow
/// should output on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Segment {
    dpid: Dpid,
    out_port: u16,
}

pub struct Router {
    config: Arc<ControllerConfig>,
    topology: Arc<RwLock<Topology>>,
    hlt: Arc<Mutex<HostLocationTable>>,
    connections: Arc<ConnectionRegistry>,
}

impl Router {
    pub fn new(
        config: Arc<ControllerConfig>,
        topology: Arc<RwLock<Topology>>,
        hlt: Arc<Mutex<HostLocationTable>>,
        connections: Arc<ConnectionRegistry>,
    ) -> Router {
        Router {
            config,
            topology,
            hlt,
            connections,
        }
    }

    /// Builds the ordered `(switch, out_port)` list for `hops`, ending at
    /// `egress_dpid`/`egress_port` (the HLT-learned host-facing port on the
    /// final switch). Returns `None` if any adjacent pair in `hops` lacks
    /// a `linking_ports` entry (spec.md §4.5 step 4).
    fn build_segments(
        &self,
        hops: &[Dpid],
        egress_port: u16,
    ) -> Option<Vec<Segment>> {
        let topology = self.topology.read().unwrap();
        let mut segments = Vec::with_capacity(hops.len());

        for window in hops.windows(2) {
            let (n1, n2) = (window[0], window[1]);
            let (p1, _p2) = topology.linking_ports(n1, n2)?;
            segments.push(Segment {
                dpid: n1,
                out_port: p1,
            });
        }

        let egress_dpid = *hops.last()?;
        segments.push(Segment {
            dpid: egress_dpid,
            out_port: egress_port,
        });

        Some(segments)
    }

    /// Installs one direction's `FlowMod`s, addressing each segment's own
    /// switch through the shared connection registry rather than the
    /// connection the triggering PacketIn arrived on — a path spanning
    /// several switches needs a distinct connection per segment (spec.md
    /// §4.5).
    async fn install_direction(&self, segments: &[Segment], match_dst: Ipv4Addr) {
        for segment in segments {
            let Some(conn) = self.connections.get(segment.dpid) else {
                tracing::warn!(
                    dpid = %segment.dpid,
                    "no live connection for path segment, skipping flow install"
                );
                continue;
            };
            let msg = SouthboundMsg::FlowMod {
                match_: FlowMatch::Ipv4Dst(match_dst),
                actions: vec![OutputAction {
                    port: segment.out_port,
                }],
                idle_timeout: Some(self.config.routing_flow_idle_timeout()),
                command: FlowModCommand::Add,
            };
            if let Err(err) = conn.send(msg) {
                tracing::warn!(dpid = %segment.dpid, %err, "flow install send failed");
            }
        }
    }
}

#[async_trait]
impl SouthboundHandler for Router {
    fn name(&self) -> &'static str {
        "router"
    }

    async fn on_packet_in(
        &self,
        _dpid: Dpid,
        _in_port: u16,
        data: &[u8],
        conn: &ConnectionHandle,
    ) {
        let Ok(frame) = EthernetFrame::decode(data) else {
            return;
        };
        if frame.ethertype != ETHERTYPE_IPV4 {
            return;
        }
        let Some((src_ip, dst_ip)) = ipv4::parse_addrs(&frame.payload) else {
            return;
        };

        if let Err(err) = self.route(src_ip, dst_ip, conn).await {
            err.log();
        }
    }
}

impl Router {
    async fn route(
        &self,
        src_ip: Ipv4Addr,
        dst_ip: Ipv4Addr,
        conn: &ConnectionHandle,
    ) -> Result<(), Error> {
        let (src_dpid, src_port) = self
            .hlt
            .lock()
            .unwrap()
            .find_by_ip(src_ip)
            .ok_or(Error::UnknownSource(src_ip))?;
        let (dst_dpid, dst_port) = self
            .hlt
            .lock()
            .unwrap()
            .find_by_ip(dst_ip)
            .ok_or(Error::UnknownDestination(dst_ip))?;

        // Forward and reverse paths are computed independently rather than
        // derived from one another (SPEC_FULL.md §4.5, grounded in
        // `original_source/routing.py`'s two separate `get_path` calls).
        let forward_hops = self
            .topology
            .read()
            .unwrap()
            .shortest_path(src_dpid, dst_dpid)
            .ok_or(Error::NoPath(src_dpid, dst_dpid))?;
        let reverse_hops = self
            .topology
            .read()
            .unwrap()
            .shortest_path(dst_dpid, src_dpid)
            .ok_or(Error::NoPath(dst_dpid, src_dpid))?;

        let forward_segments = self
            .build_segments(&forward_hops, dst_port)
            .ok_or(Error::MissingLinkingPorts(src_dpid, dst_dpid))?;
        let reverse_segments = self
            .build_segments(&reverse_hops, src_port)
            .ok_or(Error::MissingLinkingPorts(dst_dpid, src_dpid))?;

        self.install_direction(&forward_segments, dst_ip).await;
        self.install_direction(&reverse_segments, src_ip).await;

        if self.config.reinject_trigger_packet {
            if let Some(first) = forward_segments.first() {
                let _ = conn.send(SouthboundMsg::PacketOut {
                    data: Bytes::new(),
                    actions: vec![OutputAction {
                        port: first.out_port,
                    }],
                });
            }
        }

        Debug::RouteInstalled(src_dpid, dst_dpid, forward_segments.len())
            .log();
        Ok(())
    }
}
