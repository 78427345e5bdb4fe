use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use bytes::Bytes;

use sdnc_core::conn_registry::ConnectionRegistry;
use sdnc_core::hlt::HostLocationTable;
use sdnc_core::packet::ethernet::{EthernetFrame, ETHERTYPE_IPV4};
use sdnc_core::router::Router;
use sdnc_core::topology::Topology;
use sdnc_southbound::testing::fake_connection;
use sdnc_southbound::{FlowMatch, SouthboundHandler, SouthboundMsg};
use sdnc_utils::{ControllerConfig, Dpid, MacAddr};

fn ipv4_frame(src: Ipv4Addr, dst: Ipv4Addr) -> Bytes {
    let mut header = vec![0u8; 20];
    header[0] = 0x45;
    header[12..16].copy_from_slice(&src.octets());
    header[16..20].copy_from_slice(&dst.octets());
    let frame = EthernetFrame {
        dst: MacAddr::BROADCAST,
        src: MacAddr::from([0x00; 6]),
        ethertype: ETHERTYPE_IPV4,
        payload: Bytes::from(header),
    };
    Bytes::from(frame.encode())
}

/// Builds a line topology 1 - 2 - 3 - 4 - 5, with `linking_ports` populated
/// on every adjacent pair, and returns the shared pieces a `Router` needs.
fn line_topology() -> (Arc<RwLock<Topology>>, Arc<Mutex<HostLocationTable>>) {
    let mut tg = Topology::new();
    let now = Instant::now();
    for (a, b) in [(1u64, 2u64), (2, 3), (3, 4), (4, 5)] {
        tg.add_or_refresh_edge(Dpid(a), Dpid(b), now);
    }
    for (a, ap, b, bp) in [
        (1u64, 10u16, 2u64, 20u16),
        (2, 21, 3, 30),
        (3, 31, 4, 40),
        (4, 41, 5, 50),
    ] {
        tg.record_port_use(Dpid(a), ap, Dpid(b));
        tg.record_port_use(Dpid(b), bp, Dpid(a));
    }
    let hlt = HostLocationTable::new(None);
    (Arc::new(RwLock::new(tg)), Arc::new(Mutex::new(hlt)))
}

#[tokio::test]
async fn installs_bidirectional_flows_along_shortest_path() {
    let (topology, hlt) = line_topology();
    let src_ip = Ipv4Addr::new(10, 0, 0, 1);
    let dst_ip = Ipv4Addr::new(10, 0, 0, 5);
    hlt.lock().unwrap().observe(Dpid(1), 1, MacAddr::from([0xaa; 6]), src_ip);
    hlt.lock().unwrap().observe(Dpid(5), 1, MacAddr::from([0xbb; 6]), dst_ip);

    let config = Arc::new(ControllerConfig::default());
    let connections = Arc::new(ConnectionRegistry::new());
    let mut receivers = Vec::new();
    for n in 1..=5u64 {
        let (conn, rx) = fake_connection(Dpid(n));
        connections.insert(Dpid(n), conn);
        receivers.push((Dpid(n), rx));
    }

    let router = Router::new(config, topology, hlt, connections);
    let (trigger_conn, _trigger_rx) = fake_connection(Dpid(1));
    let frame = ipv4_frame(src_ip, dst_ip);
    router.on_packet_in(Dpid(1), 1, &frame, &trigger_conn).await;

    // Every switch along both the forward (1..5) and reverse (5..1) path
    // should have received exactly one FlowMod, each addressed to its own
    // connection.
    for (dpid, mut rx) in receivers {
        let msg = rx.try_recv().unwrap_or_else(|_| {
            panic!("switch {dpid:?} received no FlowMod")
        });
        assert!(matches!(
            msg,
            SouthboundMsg::FlowMod {
                match_: FlowMatch::Ipv4Dst(_),
                ..
            }
        ));
        assert!(rx.try_recv().is_ok(), "expected a second FlowMod for {dpid:?}");
        assert!(rx.try_recv().is_err(), "unexpected extra FlowMod for {dpid:?}");
    }
}

#[tokio::test]
async fn each_segment_uses_its_own_connection_not_the_trigger_connection() {
    // Regression test for the bug where every segment's FlowMod was sent
    // down the connection of the switch that produced the triggering
    // PacketIn, rather than the connection of the segment's own switch.
    let (topology, hlt) = line_topology();
    let src_ip = Ipv4Addr::new(10, 0, 0, 1);
    let dst_ip = Ipv4Addr::new(10, 0, 0, 5);
    hlt.lock().unwrap().observe(Dpid(1), 1, MacAddr::from([0xaa; 6]), src_ip);
    hlt.lock().unwrap().observe(Dpid(5), 1, MacAddr::from([0xbb; 6]), dst_ip);

    let config = Arc::new(ControllerConfig::default());
    let connections = Arc::new(ConnectionRegistry::new());

    // Every switch but the trigger (dpid 1) gets its own connection. dpid 1
    // deliberately has no registered connection: the segment on switch 1
    // must be skipped, not silently rerouted onto the PacketIn's connection.
    let mut downstream = Vec::new();
    for n in 2..=5u64 {
        let (conn, rx) = fake_connection(Dpid(n));
        connections.insert(Dpid(n), conn);
        downstream.push((Dpid(n), rx));
    }

    let router = Router::new(config, topology, hlt, connections);
    let (trigger_conn, _ignored) = fake_connection(Dpid(1));
    let frame = ipv4_frame(src_ip, dst_ip);
    router.on_packet_in(Dpid(1), 1, &frame, &trigger_conn).await;

    // Switches 2-4 each get exactly one forward-direction FlowMod (they sit
    // on the forward path) and one reverse-direction FlowMod (they also sit
    // on the reverse path), for a total of two per switch; switch 5 (the
    // egress) likewise gets two. None of them land on the trigger's own
    // receiver, since switch 1 has no registered connection.
    for (dpid, mut rx) in downstream {
        assert!(rx.try_recv().is_ok(), "missing FlowMod for {dpid:?}");
        assert!(rx.try_recv().is_ok(), "missing second FlowMod for {dpid:?}");
    }
}

#[tokio::test]
async fn aborts_when_source_unknown() {
    let (topology, hlt) = line_topology();
    let config = Arc::new(ControllerConfig::default());
    let connections = Arc::new(ConnectionRegistry::new());
    let (conn, mut rx) = fake_connection(Dpid(1));
    connections.insert(Dpid(1), conn.clone());

    let router = Router::new(config, topology, hlt, connections);
    let frame = ipv4_frame(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 5));
    router.on_packet_in(Dpid(1), 1, &frame, &conn).await;

    assert!(rx.try_recv().is_err());
}
