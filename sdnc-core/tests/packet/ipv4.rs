use std::net::Ipv4Addr;

use sdnc_core::packet::ipv4;

fn header(src: Ipv4Addr, dst: Ipv4Addr) -> Vec<u8> {
    let mut buf = vec![0u8; 20];
    buf[0] = 0x45; // version 4, IHL 5
    buf[12..16].copy_from_slice(&src.octets());
    buf[16..20].copy_from_slice(&dst.octets());
    buf
}

#[test]
fn parses_addresses() {
    let src = Ipv4Addr::new(10, 0, 0, 1);
    let dst = Ipv4Addr::new(10, 0, 0, 2);
    let payload = header(src, dst);
    assert_eq!(ipv4::parse_addrs(&payload), Some((src, dst)));
}

#[test]
fn rejects_truncated_header() {
    let payload = &header(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2))[..19];
    assert_eq!(ipv4::parse_addrs(payload), None);
}

#[test]
fn rejects_non_ipv4_version() {
    let mut payload = header(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2));
    payload[0] = 0x65; // version 6
    assert_eq!(ipv4::parse_addrs(&payload), None);
}
