use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, RwLock};

use bytes::Bytes;

use sdnc_core::conn_registry::ConnectionRegistry;
use sdnc_core::discovery::Discovery;
use sdnc_core::hlt::HostLocationTable;
use sdnc_core::packet::arp::{ArpPacket, OP_REQUEST};
use sdnc_core::packet::ethernet::{EthernetFrame, ETHERTYPE_ARP, ETHERTYPE_LLDP};
use sdnc_core::packet::lldp::LldpPacket;
use sdnc_core::topology::Topology;
use sdnc_southbound::testing::fake_connection;
use sdnc_southbound::{PortConfig, PortDesc, SouthboundHandler, SouthboundMsg};
use sdnc_utils::{ControllerConfig, Dpid, MacAddr};

fn new_discovery() -> (
    Discovery,
    Arc<RwLock<Topology>>,
    Arc<Mutex<HostLocationTable>>,
    Arc<ConnectionRegistry>,
) {
    let config = Arc::new(ControllerConfig::default());
    let topology = Arc::new(RwLock::new(Topology::new()));
    let hlt = Arc::new(Mutex::new(HostLocationTable::new(None)));
    let connections = Arc::new(ConnectionRegistry::new());
    let discovery = Discovery::new(
        config,
        topology.clone(),
        hlt.clone(),
        connections.clone(),
    );
    (discovery, topology, hlt, connections)
}

fn lldp_frame(chassis_dpid: u64, port_id: u32) -> Bytes {
    let lldp = LldpPacket {
        chassis_dpid,
        port_id,
        ttl_secs: 1,
    };
    let frame = EthernetFrame {
        dst: MacAddr::LLDP_MULTICAST,
        src: MacAddr::from([0x00; 6]),
        ethertype: ETHERTYPE_LLDP,
        payload: Bytes::from(lldp.encode()),
    };
    Bytes::from(frame.encode())
}

fn arp_request_frame(sender_mac: MacAddr, sender_ip: Ipv4Addr) -> Bytes {
    let arp = ArpPacket {
        op: OP_REQUEST,
        sender_mac,
        sender_ip,
        target_mac: MacAddr::BROADCAST,
        target_ip: Ipv4Addr::new(10, 0, 0, 254),
    };
    let frame = EthernetFrame {
        dst: MacAddr::BROADCAST,
        src: sender_mac,
        ethertype: ETHERTYPE_ARP,
        payload: Bytes::from(arp.encode()),
    };
    Bytes::from(frame.encode())
}

#[tokio::test]
async fn connection_up_adds_node_and_populates_connection_registry() {
    let (discovery, topology, _hlt, connections) = new_discovery();
    let (conn, mut rx) = fake_connection(Dpid(1));
    let ports = vec![PortDesc {
        port_no: 1,
        hw_addr: [0x00, 0x00, 0x00, 0x00, 0x00, 0x01],
    }];

    discovery.on_connection_up(Dpid(1), &ports, &conn).await;

    assert!(topology.read().unwrap().has_node(Dpid(1)));
    assert!(connections.get(Dpid(1)).is_some());

    // The catch-all LLDP and ARP-broadcast FlowMods are installed.
    assert!(matches!(
        rx.try_recv(),
        Ok(SouthboundMsg::FlowMod { .. })
    ));
    assert!(matches!(
        rx.try_recv(),
        Ok(SouthboundMsg::FlowMod { .. })
    ));
}

#[tokio::test]
async fn connection_down_removes_node_and_connection() {
    let (discovery, topology, _hlt, connections) = new_discovery();
    let (conn, _rx) = fake_connection(Dpid(1));
    discovery.on_connection_up(Dpid(1), &[], &conn).await;
    assert!(topology.read().unwrap().has_node(Dpid(1)));

    discovery.on_connection_down(Dpid(1)).await;

    assert!(!topology.read().unwrap().has_node(Dpid(1)));
    assert!(connections.get(Dpid(1)).is_none());
}

#[tokio::test]
async fn connection_down_tears_down_incident_links() {
    let (discovery, topology, _hlt, _connections) = new_discovery();
    let (conn1, _rx1) = fake_connection(Dpid(1));
    let (conn2, _rx2) = fake_connection(Dpid(2));
    discovery.on_connection_up(Dpid(1), &[], &conn1).await;
    discovery.on_connection_up(Dpid(2), &[], &conn2).await;

    discovery
        .on_packet_in(Dpid(1), 3, &lldp_frame(2, 5), &conn1)
        .await;
    assert!(topology.read().unwrap().has_edge(Dpid(1), Dpid(2)));

    discovery.on_connection_down(Dpid(2)).await;

    assert!(!topology.read().unwrap().has_node(Dpid(2)));
    assert!(!topology.read().unwrap().has_edge(Dpid(1), Dpid(2)));
}

#[tokio::test]
async fn packet_in_lldp_forms_adjacency() {
    let (discovery, topology, _hlt, _connections) = new_discovery();
    let (conn, _rx) = fake_connection(Dpid(1));
    discovery.on_connection_up(Dpid(1), &[], &conn).await;

    // Switch 1 receives an LLDP PDU on port 3 identifying neighbor dpid=2,
    // port=5.
    discovery
        .on_packet_in(Dpid(1), 3, &lldp_frame(2, 5), &conn)
        .await;

    let topology = topology.read().unwrap();
    assert!(topology.has_node(Dpid(2)));
    assert!(topology.has_edge(Dpid(1), Dpid(2)));
    // Only switch 1's side has reported its port yet; `linking_ports`
    // requires both sides (spec.md §4.1).
    assert_eq!(topology.linking_ports(Dpid(1), Dpid(2)), None);
}

#[tokio::test]
async fn packet_in_malformed_lldp_is_dropped() {
    let (discovery, topology, _hlt, _connections) = new_discovery();
    let (conn, _rx) = fake_connection(Dpid(1));
    discovery.on_connection_up(Dpid(1), &[], &conn).await;

    let mut garbage = lldp_frame(2, 5).to_vec();
    garbage.truncate(garbage.len() - 5);

    discovery
        .on_packet_in(Dpid(1), 3, &garbage, &conn)
        .await;

    assert!(!topology.read().unwrap().has_node(Dpid(2)));
}

#[tokio::test]
async fn packet_in_arp_observes_host_in_hlt() {
    let (discovery, _topology, hlt, _connections) = new_discovery();
    let (conn, _rx) = fake_connection(Dpid(1));
    discovery.on_connection_up(Dpid(1), &[], &conn).await;

    let sender_mac = MacAddr::from([0xaa; 6]);
    let sender_ip = Ipv4Addr::new(10, 0, 0, 1);
    let frame = arp_request_frame(sender_mac, sender_ip);

    discovery.on_packet_in(Dpid(1), 7, &frame, &conn).await;

    assert_eq!(hlt.lock().unwrap().find_by_ip(sender_ip), Some((Dpid(1), 7)));
}

#[tokio::test]
async fn port_status_down_removes_the_affected_edge() {
    let (discovery, topology, _hlt, _connections) = new_discovery();
    let (conn1, _rx1) = fake_connection(Dpid(1));
    let (conn2, _rx2) = fake_connection(Dpid(2));
    discovery.on_connection_up(Dpid(1), &[], &conn1).await;
    discovery.on_connection_up(Dpid(2), &[], &conn2).await;
    // Both directions of LLDP, so `remote_endpoint` can resolve the
    // neighbor on the affected port.
    discovery
        .on_packet_in(Dpid(1), 3, &lldp_frame(2, 5), &conn1)
        .await;
    discovery
        .on_packet_in(Dpid(2), 5, &lldp_frame(1, 3), &conn2)
        .await;
    assert!(topology.read().unwrap().has_edge(Dpid(1), Dpid(2)));

    discovery
        .on_port_status(Dpid(1), 3, PortConfig { down: true })
        .await;

    assert!(!topology.read().unwrap().has_edge(Dpid(1), Dpid(2)));
}

#[tokio::test]
async fn port_status_up_is_ignored() {
    let (discovery, topology, _hlt, _connections) = new_discovery();
    let (conn1, _rx1) = fake_connection(Dpid(1));
    let (conn2, _rx2) = fake_connection(Dpid(2));
    discovery.on_connection_up(Dpid(1), &[], &conn1).await;
    discovery.on_connection_up(Dpid(2), &[], &conn2).await;
    discovery
        .on_packet_in(Dpid(1), 3, &lldp_frame(2, 5), &conn1)
        .await;
    discovery
        .on_packet_in(Dpid(2), 5, &lldp_frame(1, 3), &conn2)
        .await;

    discovery
        .on_port_status(Dpid(1), 3, PortConfig { down: false })
        .await;

    assert!(topology.read().unwrap().has_edge(Dpid(1), Dpid(2)));
}
