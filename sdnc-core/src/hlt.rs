//
// Copyright (c) The sdnc Contributors
//
// SPDX-License-Identifier: MIT
//

//! The Host Location Table (HLT): a content-addressed, append-mostly set
//! of `(dpid, port, mac, ipv4)` records built from passive ARP observation
//! (spec.md §3, §4.2).

use std::net::Ipv4Addr;
use std::time::Instant;

use sdnc_utils::{Dpid, MacAddr};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HostRecord {
    pub dpid: Dpid,
    pub port: u16,
    pub mac: MacAddr,
    pub ip: Ipv4Addr,
}

#[derive(Debug)]
struct Entry {
    record: HostRecord,
    last_seen: Instant,
}

/// Whether `observe` appended a new record or found an existing match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Observation {
    New,
    Known,
}

/// The shared host-location singleton. Entries are pushed to a `Vec` in
/// observation order so `find_by_ip` can honor the "first registered wins"
/// rule (spec.md §3 H1) with a plain linear scan.
#[derive(Debug, Default)]
pub struct HostLocationTable {
    entries: Vec<Entry>,
    max_age: Option<std::time::Duration>,
}

impl HostLocationTable {
    /// `max_age` is the supplemental, default-off aging hook (SPEC_FULL.md
    /// §9): `None` reproduces the core's unbounded-growth behavior exactly.
    pub fn new(max_age: Option<std::time::Duration>) -> HostLocationTable {
        HostLocationTable {
            entries: Vec::new(),
            max_age,
        }
    }

    /// Appends the tuple if no equal tuple already exists (invariant H1).
    /// An existing matching record has its `last_seen` stamp refreshed so
    /// the optional reaper does not evict an actively-seen host.
    pub fn observe(
        &mut self,
        dpid: Dpid,
        port: u16,
        mac: MacAddr,
        ip: Ipv4Addr,
    ) -> Observation {
        let now = Instant::now();
        if let Some(entry) = self.entries.iter_mut().find(|entry| {
            entry.record.dpid == dpid
                && entry.record.port == port
                && entry.record.mac == mac
                && entry.record.ip == ip
        }) {
            entry.last_seen = now;
            return Observation::Known;
        }

        self.entries.push(Entry {
            record: HostRecord {
                dpid,
                port,
                mac,
                ip,
            },
            last_seen: now,
        });
        Observation::New
    }

    /// Returns the first-registered record matching `ip`, in insertion
    /// order.
    pub fn find_by_ip(&self, ip: Ipv4Addr) -> Option<(Dpid, u16)> {
        self.entries
            .iter()
            .find(|entry| entry.record.ip == ip)
            .map(|entry| (entry.record.dpid, entry.record.port))
    }

    /// Bulk-loads static entries at startup, used when ARP-based discovery
    /// is disabled for bring-up (spec.md §4.2, §6 `HLT_SEED`).
    pub fn seed(&mut self, records: impl IntoIterator<Item = HostRecord>) {
        for record in records {
            self.observe(record.dpid, record.port, record.mac, record.ip);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(any(test, feature = "testing"))]
    pub fn records(&self) -> impl Iterator<Item = HostRecord> + '_ {
        self.entries.iter().map(|entry| entry.record)
    }

    /// Removes records whose `last_seen` stamp is older than `max_age`.
    /// A no-op when the table was constructed with `max_age: None`.
    pub fn reap_expired(&mut self) -> usize {
        let Some(max_age) = self.max_age else {
            return 0;
        };
        let now = Instant::now();
        let before = self.entries.len();
        self.entries
            .retain(|entry| now.duration_since(entry.last_seen) <= max_age);
        before - self.entries.len()
    }
}
