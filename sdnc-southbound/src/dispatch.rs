//
// Copyright (c) The sdnc Contributors
//
// SPDX-License-Identifier: MIT
//

use async_trait::async_trait;

use crate::debug::Debug;
use crate::{ConnectionHandle, PortConfig, SouthboundEvent};
use sdnc_utils::Dpid;

/// A southbound-facing component: the Discovery Engine, the ARP Responder,
/// or the Reactive Router.
///
/// Mirrors this codebase's `SouthboundRxCallbacks` pattern: one method per
/// event kind, with a default no-op body so a component only overrides the
/// events it actually cares about (spec.md §4: AR never touches
/// ConnectionUp/Down, RR never touches PortStatus, etc).
#[async_trait]
pub trait SouthboundHandler: Send + Sync {
    /// A short label used in dispatcher trace spans.
    fn name(&self) -> &'static str;

    async fn on_connection_up(
        &self,
        _dpid: Dpid,
        _ports: &[crate::PortDesc],
        _conn: &ConnectionHandle,
    ) {
    }

    async fn on_connection_down(&self, _dpid: Dpid) {}

    async fn on_port_status(
        &self,
        _dpid: Dpid,
        _port: u16,
        _config: PortConfig,
    ) {
    }

    async fn on_packet_in(
        &self,
        _dpid: Dpid,
        _in_port: u16,
        _data: &[u8],
        _conn: &ConnectionHandle,
    ) {
    }
}

/// Dispatches southbound events to an ordered list of handlers.
///
/// Per spec.md §2, "SA dispatches events to DE, AR, RR in that registration
/// order" — registration order is preserved exactly as handlers are added,
/// and every handler sees every event of the kinds it doesn't ignore.
#[derive(Default)]
pub struct Dispatcher {
    handlers: Vec<Box<dyn SouthboundHandler>>,
}

impl Dispatcher {
    pub fn new() -> Dispatcher {
        Dispatcher::default()
    }

    /// Registers a component to receive southbound events, in order.
    pub fn register(&mut self, handler: Box<dyn SouthboundHandler>) {
        self.handlers.push(handler);
    }

    /// Number of registered handlers, in registration order.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Names of registered handlers, in registration order (diagnostics).
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Delivers one event to every registered handler in registration
    /// order. Each handler is a failure domain of its own (spec.md §7):
    /// panics aside, a handler's internal errors never stop delivery to the
    /// handlers registered after it.
    pub async fn dispatch(&self, event: &SouthboundEvent) {
        Debug::EventRx(event).log();

        for handler in &self.handlers {
            match event {
                SouthboundEvent::ConnectionUp { dpid, ports, conn } => {
                    handler.on_connection_up(*dpid, ports, conn).await;
                }
                SouthboundEvent::ConnectionDown { dpid } => {
                    handler.on_connection_down(*dpid).await;
                }
                SouthboundEvent::PortStatus {
                    dpid,
                    port,
                    config,
                } => {
                    handler.on_port_status(*dpid, *port, *config).await;
                }
                SouthboundEvent::PacketIn {
                    dpid,
                    in_port,
                    data,
                    conn,
                } => {
                    handler.on_packet_in(*dpid, *in_port, data, conn).await;
                }
            }
        }
    }
}
