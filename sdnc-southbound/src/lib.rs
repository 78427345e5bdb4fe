//
// Copyright (c) The sdnc Contributors
//
// SPDX-License-Identifier: MIT
//

//! The contract between the controller core and the external OpenFlow-style
//! southbound stack.
//!
//! The southbound framing protocol itself — the wire encoding, the
//! connection handshake, the transport — is an out-of-scope external
//! collaborator (spec.md §1). What lives here is the seam: the event enum
//! the adapter delivers, the message types the core sends back, and the
//! ordered dispatcher that hands each event to the registered components
//! (spec.md §2: "SA dispatches events to DE, AR, RR in that registration
//! order").

pub mod debug;
pub mod dispatch;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

use bytes::Bytes;
use sdnc_utils::Dpid;
use tokio::sync::mpsc;

pub use dispatch::{Dispatcher, SouthboundHandler};

/// The reserved output port meaning "send to the controller" (OpenFlow's
/// `OFPP_CONTROLLER`). Used by the Discovery Engine's catch-all flow rules
/// (spec.md §4.3.1).
pub const CONTROLLER_PORT: u16 = 0xfffd;

/// A single switch port as reported by ConnectionUp.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PortDesc {
    pub port_no: u16,
    pub hw_addr: [u8; 6],
}

/// Whether a port's administrative config bit denotes it as down.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PortConfig {
    pub down: bool,
}

impl PortConfig {
    /// `config == 1` denotes administratively down (spec.md §6).
    pub fn from_raw(config: u32) -> PortConfig {
        PortConfig {
            down: config & 0x1 != 0,
        }
    }
}

/// A lightweight, cloneable handle used to address outbound messages at the
/// connection that produced an inbound event. The real implementation (a
/// live OpenFlow TCP session) lives in the external southbound stack; this
/// handle is the seam the core talks through.
#[derive(Clone)]
pub struct ConnectionHandle {
    dpid: Dpid,
    tx: mpsc::UnboundedSender<SouthboundMsg>,
}

impl ConnectionHandle {
    pub fn new(
        dpid: Dpid,
        tx: mpsc::UnboundedSender<SouthboundMsg>,
    ) -> ConnectionHandle {
        ConnectionHandle { dpid, tx }
    }

    pub fn dpid(&self) -> Dpid {
        self.dpid
    }

    /// Sends a message to the southbound adapter for delivery on this
    /// connection. Returns an error if the connection has since closed
    /// (spec.md §7, southbound failure taxonomy); the caller treats this as
    /// a transient drop.
    pub fn send(&self, msg: SouthboundMsg) -> Result<(), SendError> {
        self.tx.send(msg).map_err(|_| SendError::ConnectionClosed)
    }
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("dpid", &self.dpid)
            .finish()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SendError {
    ConnectionClosed,
}

impl std::fmt::Display for SendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SendError::ConnectionClosed => {
                write!(f, "connection closed")
            }
        }
    }
}

impl std::error::Error for SendError {}

/// Events delivered by the southbound adapter (spec.md §6).
#[derive(Clone, Debug)]
pub enum SouthboundEvent {
    ConnectionUp {
        dpid: Dpid,
        ports: Vec<PortDesc>,
        conn: ConnectionHandle,
    },
    ConnectionDown {
        dpid: Dpid,
    },
    PortStatus {
        dpid: Dpid,
        port: u16,
        config: PortConfig,
    },
    PacketIn {
        dpid: Dpid,
        in_port: u16,
        data: Bytes,
        conn: ConnectionHandle,
    },
}

impl SouthboundEvent {
    pub fn dpid(&self) -> Dpid {
        match self {
            SouthboundEvent::ConnectionUp { dpid, .. }
            | SouthboundEvent::ConnectionDown { dpid }
            | SouthboundEvent::PortStatus { dpid, .. }
            | SouthboundEvent::PacketIn { dpid, .. } => *dpid,
        }
    }
}

/// Match fields for an installed flow (spec.md §6: "Installed flow match
/// layout").
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FlowMatch {
    Lldp,
    ArpBroadcast,
    Ipv4Dst(std::net::Ipv4Addr),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FlowModCommand {
    Add,
    Delete,
}

/// A single output action (the only action kind the core ever issues).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OutputAction {
    pub port: u16,
}

/// Messages the core emits to the southbound adapter (spec.md §6).
#[derive(Clone, Debug)]
pub enum SouthboundMsg {
    FlowMod {
        match_: FlowMatch,
        actions: Vec<OutputAction>,
        idle_timeout: Option<std::time::Duration>,
        command: FlowModCommand,
    },
    PacketOut {
        data: Bytes,
        actions: Vec<OutputAction>,
    },
}
