//
// Copyright (c) The sdnc Contributors
//
// SPDX-License-Identifier: MIT
//

//! Shared per-switch connection lookup, populated by the Discovery Engine
//! from ConnectionUp/ConnectionDown events (spec.md §4.3) and consulted by
//! any component that needs to address a switch other than the one that
//! produced the triggering event — the Reactive Router, whose installed
//! path may span several switches (spec.md §4.5).

use std::collections::HashMap;
use std::sync::Mutex;

use sdnc_southbound::ConnectionHandle;
use sdnc_utils::Dpid;

#[derive(Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<Dpid, ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> ConnectionRegistry {
        ConnectionRegistry::default()
    }

    pub fn insert(&self, dpid: Dpid, conn: ConnectionHandle) {
        self.connections.lock().unwrap().insert(dpid, conn);
    }

    pub fn remove(&self, dpid: Dpid) {
        self.connections.lock().unwrap().remove(&dpid);
    }

    pub fn get(&self, dpid: Dpid) -> Option<ConnectionHandle> {
        self.connections.lock().unwrap().get(&dpid).cloned()
    }
}
