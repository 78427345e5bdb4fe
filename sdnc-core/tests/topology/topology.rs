use std::time::Instant;

use sdnc_core::topology::Topology;
use sdnc_utils::Dpid;

fn dpid(n: u64) -> Dpid {
    Dpid(n)
}

#[test]
fn add_node_is_idempotent() {
    let mut tg = Topology::new();
    tg.add_node(dpid(1));
    tg.add_node(dpid(1));
    assert_eq!(tg.node_count(), 1);
}

#[test]
fn add_or_refresh_edge_is_order_independent() {
    let mut tg = Topology::new();
    let t0 = Instant::now();
    tg.add_or_refresh_edge(dpid(1), dpid(2), t0);
    let t1 = t0 + std::time::Duration::from_secs(1);
    tg.add_or_refresh_edge(dpid(2), dpid(1), t1);

    assert_eq!(tg.edge_count(), 1);
    assert_eq!(tg.edge_timestamp(dpid(1), dpid(2)), Some(t1));
    assert_eq!(tg.edge_timestamp(dpid(2), dpid(1)), Some(t1));
}

#[test]
fn record_port_use_is_idempotent() {
    let mut tg = Topology::new();
    tg.record_port_use(dpid(1), 3, dpid(2));
    tg.record_port_use(dpid(1), 3, dpid(2));
    tg.record_port_use(dpid(2), 5, dpid(1));

    assert_eq!(tg.linking_ports(dpid(1), dpid(2)), Some((3, 5)));
}

#[test]
fn linking_ports_none_until_symmetric() {
    let mut tg = Topology::new();
    tg.record_port_use(dpid(2), 5, dpid(1));
    assert_eq!(tg.linking_ports(dpid(1), dpid(2)), None);
    tg.record_port_use(dpid(1), 3, dpid(2));
    assert_eq!(tg.linking_ports(dpid(1), dpid(2)), Some((3, 5)));
}

#[test]
fn remote_endpoint_lookup() {
    let mut tg = Topology::new();
    tg.record_port_use(dpid(1), 3, dpid(2));
    tg.record_port_use(dpid(2), 5, dpid(1));
    assert_eq!(tg.remote_endpoint(dpid(1), 3), Some((dpid(2), 5)));
    assert_eq!(tg.remote_endpoint(dpid(1), 99), None);
}

#[test]
fn delete_edge_on_missing_pair_is_a_noop() {
    let mut tg = Topology::new();
    tg.add_node(dpid(1));
    tg.delete_edge(dpid(1), dpid(2));
    assert_eq!(tg.edge_count(), 0);
}

#[test]
fn delete_edge_removes_both_sides() {
    let mut tg = Topology::new();
    let now = Instant::now();
    tg.add_or_refresh_edge(dpid(1), dpid(3), now);
    tg.record_port_use(dpid(1), 7, dpid(3));
    tg.record_port_use(dpid(3), 9, dpid(1));

    tg.delete_edge(dpid(1), dpid(3));

    assert!(!tg.has_edge(dpid(1), dpid(3)));
    assert_eq!(tg.linking_ports(dpid(1), dpid(3)), None);
    assert_eq!(tg.remote_endpoint(dpid(1), 7), None);
}

#[test]
fn remove_node_deletes_incident_edges() {
    let mut tg = Topology::new();
    let now = Instant::now();
    tg.add_or_refresh_edge(dpid(1), dpid(3), now);
    tg.add_or_refresh_edge(dpid(1), dpid(4), now);
    tg.record_port_use(dpid(1), 1, dpid(3));
    tg.record_port_use(dpid(3), 1, dpid(1));
    tg.record_port_use(dpid(1), 2, dpid(4));
    tg.record_port_use(dpid(4), 1, dpid(1));

    tg.remove_node(dpid(1));

    assert!(!tg.has_node(dpid(1)));
    assert!(!tg.has_edge(dpid(1), dpid(3)));
    assert!(!tg.has_edge(dpid(1), dpid(4)));
    assert_eq!(tg.remote_endpoint(dpid(3), 1), None);
}

#[test]
fn shortest_path_trivial_and_disconnected() {
    let mut tg = Topology::new();
    tg.add_node(dpid(1));
    assert_eq!(tg.shortest_path(dpid(1), dpid(1)), Some(vec![dpid(1)]));

    tg.add_node(dpid(2));
    assert_eq!(tg.shortest_path(dpid(1), dpid(2)), None);
    assert_eq!(tg.shortest_path(dpid(1), dpid(99)), None);
}

#[test]
fn shortest_path_over_a_line() {
    let mut tg = Topology::new();
    let now = Instant::now();
    // Line: 5 - 4 - 1 - 3 - 2
    for (a, b) in [(5, 4), (4, 1), (1, 3), (3, 2)] {
        tg.add_or_refresh_edge(dpid(a), dpid(b), now);
    }
    let path = tg.shortest_path(dpid(5), dpid(2)).unwrap();
    assert_eq!(path, vec![dpid(5), dpid(4), dpid(1), dpid(3), dpid(2)]);
}

#[test]
fn shortest_path_prefers_fewer_hops() {
    let mut tg = Topology::new();
    let now = Instant::now();
    // Two disjoint routes from 1 to 4: the 2-hop direct one via 2, and
    // a longer detour via 5/6.
    tg.add_or_refresh_edge(dpid(1), dpid(2), now);
    tg.add_or_refresh_edge(dpid(2), dpid(4), now);
    tg.add_or_refresh_edge(dpid(1), dpid(5), now);
    tg.add_or_refresh_edge(dpid(5), dpid(6), now);
    tg.add_or_refresh_edge(dpid(6), dpid(4), now);

    let path = tg.shortest_path(dpid(1), dpid(4)).unwrap();
    assert_eq!(path.len(), 3);
    assert_eq!(path, vec![dpid(1), dpid(2), dpid(4)]);
}
