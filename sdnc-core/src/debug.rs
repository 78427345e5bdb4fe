//
// Copyright (c) The sdnc Contributors
//
// SPDX-License-Identifier: MIT
//

use sdnc_utils::Dpid;
use tracing::{debug, debug_span};

// Debug messages.
#[derive(Debug)]
pub enum Debug<'a> {
    LinkUp(Dpid, u16, Dpid, u16),
    LinkDown(Dpid, Dpid),
    SwitchAdded(Dpid),
    SwitchRemoved(Dpid),
    LldpEmit(Dpid, u16),
    ArpReply(Dpid, u16, &'a std::net::Ipv4Addr),
    LinkCollectorSweep(usize),
    RouteInstalled(Dpid, Dpid, usize),
}

// ===== impl Debug =====

impl Debug<'_> {
    pub fn log(&self) {
        debug_span!("core").in_scope(|| match self {
            Debug::LinkUp(n1, p1, n2, p2) => {
                debug!(%n1, p1, %n2, p2, "{}", self);
            }
            Debug::LinkDown(n1, n2) => {
                debug!(%n1, %n2, "{}", self);
            }
            Debug::SwitchAdded(dpid) => {
                debug!(%dpid, "{}", self);
            }
            Debug::SwitchRemoved(dpid) => {
                debug!(%dpid, "{}", self);
            }
            Debug::LldpEmit(dpid, port) => {
                debug!(%dpid, port, "{}", self);
            }
            Debug::ArpReply(dpid, port, target_ip) => {
                debug!(%dpid, port, %target_ip, "{}", self);
            }
            Debug::LinkCollectorSweep(expired) => {
                debug!(expired, "{}", self);
            }
            Debug::RouteInstalled(src, dst, hops) => {
                debug!(%src, %dst, hops, "{}", self);
            }
        });
    }
}

impl std::fmt::Display for Debug<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::LinkUp(..) => write!(f, "link discovered"),
            Debug::LinkDown(..) => write!(f, "link removed"),
            Debug::SwitchAdded(_) => write!(f, "switch added to topology"),
            Debug::SwitchRemoved(_) => {
                write!(f, "switch removed from topology")
            }
            Debug::LldpEmit(..) => write!(f, "LLDP probe emitted"),
            Debug::ArpReply(..) => write!(f, "ARP reply sent"),
            Debug::LinkCollectorSweep(_) => {
                write!(f, "link collector sweep complete")
            }
            Debug::RouteInstalled(..) => write!(f, "route installed"),
        }
    }
}
