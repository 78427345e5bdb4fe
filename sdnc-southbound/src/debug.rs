//
// Copyright (c) The sdnc Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::{debug, debug_span};

use crate::SouthboundEvent;

// Debug messages.
#[derive(Debug)]
pub enum Debug<'a> {
    EventRx(&'a SouthboundEvent),
}

// ===== impl Debug =====

impl Debug<'_> {
    // Log debug message using the tracing API.
    pub fn log(&self) {
        match self {
            Debug::EventRx(event) => {
                debug_span!("southbound").in_scope(|| {
                    debug_span!("input").in_scope(|| {
                        debug!(dpid = %event.dpid(), "{}", self);
                    })
                });
            }
        }
    }
}

impl std::fmt::Display for Debug<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::EventRx(event) => match event {
                SouthboundEvent::ConnectionUp { .. } => {
                    write!(f, "connection up")
                }
                SouthboundEvent::ConnectionDown { .. } => {
                    write!(f, "connection down")
                }
                SouthboundEvent::PortStatus { .. } => {
                    write!(f, "port status")
                }
                SouthboundEvent::PacketIn { .. } => {
                    write!(f, "packet in")
                }
            },
        }
    }
}
