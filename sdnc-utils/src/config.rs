//
// Copyright (c) The sdnc Contributors
//
// SPDX-License-Identifier: MIT
//

use std::time::Duration;

use serde::Deserialize;

use crate::mac_addr::MacAddr;

/// Process-wide controller constants (spec.md §6).
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    /// Fixed L2 identity used as the ARP proxy's source and in LLDP
    /// ChassisID sub-TLVs.
    pub controller_mac: MacAddr,
    /// Probe period and base unit of link freshness, in seconds.
    pub lldp_ttl_secs: u64,
    /// Idle timeout applied to reactively installed forwarding flows.
    pub routing_flow_idle_timeout_secs: u64,
    /// Port numbers at or above this threshold are reserved/virtual and are
    /// skipped when emitting LLDP probes.
    pub max_physical_port: u16,
    /// When true, the router additionally emits a `PacketOut` for the
    /// triggering packet along the first forward-segment port, avoiding the
    /// single dropped packet the spec acknowledges as a known limitation.
    pub reinject_trigger_packet: bool,
    /// Optional cap on how long a host record may go unrefreshed before the
    /// (optional) HLT reaper removes it. `None` preserves the core's
    /// default unbounded-growth behavior.
    pub host_max_age_secs: Option<u64>,
}

impl ControllerConfig {
    pub fn lldp_ttl(&self) -> Duration {
        Duration::from_secs(self.lldp_ttl_secs)
    }

    /// Period of the link collector: `3 * LLDP_TTL` (spec.md §6).
    pub fn link_collector_period(&self) -> Duration {
        self.lldp_ttl() * 3
    }

    /// Staleness threshold for an edge: `3 * LLDP_TTL` (spec.md §3, E2).
    pub fn link_staleness(&self) -> Duration {
        self.lldp_ttl() * 3
    }

    pub fn routing_flow_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.routing_flow_idle_timeout_secs)
    }

    pub fn host_max_age(&self) -> Option<Duration> {
        self.host_max_age_secs.map(Duration::from_secs)
    }
}

impl Default for ControllerConfig {
    fn default() -> ControllerConfig {
        ControllerConfig {
            controller_mac: MacAddr::from([0x00, 0x00, 0xca, 0xfe, 0xba, 0xbe]),
            lldp_ttl_secs: 1,
            routing_flow_idle_timeout_secs: 15,
            max_physical_port: 0xff00,
            reinject_trigger_packet: false,
            host_max_age_secs: None,
        }
    }
}
