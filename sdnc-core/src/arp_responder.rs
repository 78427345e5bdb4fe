//
// Copyright (c) The sdnc Contributors
//
// SPDX-License-Identifier: MIT
//

//! The ARP Responder (AR): answers every ARP request with the
//! controller's MAC so host-to-host IP traffic always lands on the
//! controller's path (spec.md §4.4).

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use sdnc_southbound::{
    ConnectionHandle, OutputAction, SouthboundHandler, SouthboundMsg,
};
use sdnc_utils::{ControllerConfig, Dpid};

use crate::debug::Debug;
use crate::packet::arp::{ArpPacket, OP_REPLY};
use crate::packet::ethernet::{EthernetFrame, ETHERTYPE_ARP};

#[derive(Debug)]
pub enum Error {
    SendFailed(sdnc_southbound::SendError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::SendFailed(err) => {
                write!(f, "southbound send failed: {err}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn log(&self) {
        tracing::warn!("{self}");
    }
}

pub struct ArpResponder {
    config: Arc<ControllerConfig>,
}

impl ArpResponder {
    pub fn new(config: Arc<ControllerConfig>) -> ArpResponder {
        ArpResponder { config }
    }
}

#[async_trait]
impl SouthboundHandler for ArpResponder {
    fn name(&self) -> &'static str {
        "arp_responder"
    }

    async fn on_packet_in(
        &self,
        dpid: Dpid,
        in_port: u16,
        data: &[u8],
        conn: &ConnectionHandle,
    ) {
        let Ok(frame) = EthernetFrame::decode(data) else {
            return;
        };
        if frame.ethertype != ETHERTYPE_ARP {
            return;
        }
        let Ok(request) = ArpPacket::decode(&frame.payload) else {
            return;
        };
        if !request.is_request() {
            // Observed only; HLT learning happens in the Discovery Engine's
            // independent handling of the same PacketIn event.
            return;
        }

        let reply = ArpPacket {
            op: OP_REPLY,
            sender_mac: self.config.controller_mac,
            sender_ip: request.target_ip,
            target_mac: request.sender_mac,
            target_ip: request.sender_ip,
        };
        let reply_frame = EthernetFrame {
            dst: request.sender_mac,
            src: self.config.controller_mac,
            ethertype: ETHERTYPE_ARP,
            payload: Bytes::from(reply.encode()),
        };

        let msg = SouthboundMsg::PacketOut {
            data: Bytes::from(reply_frame.encode()),
            actions: vec![OutputAction { port: in_port }],
        };

        match conn.send(msg) {
            Ok(()) => Debug::ArpReply(dpid, in_port, &request.sender_ip).log(),
            Err(err) => Error::SendFailed(err).log(),
        }
    }
}
