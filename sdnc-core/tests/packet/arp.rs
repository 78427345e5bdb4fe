use std::net::Ipv4Addr;

use sdnc_core::packet::arp::{ArpPacket, LENGTH, OP_REQUEST};
use sdnc_core::packet::DecodeError;
use sdnc_utils::MacAddr;

fn sample() -> ArpPacket {
    ArpPacket {
        op: OP_REQUEST,
        sender_mac: MacAddr::from([0xaa; 6]),
        sender_ip: Ipv4Addr::new(10, 0, 0, 1),
        target_mac: MacAddr::BROADCAST,
        target_ip: Ipv4Addr::new(10, 0, 0, 2),
    }
}

#[test]
fn round_trips() {
    let packet = sample();
    let encoded = packet.encode();
    assert_eq!(encoded.len(), LENGTH);
    assert_eq!(ArpPacket::decode(&encoded).unwrap(), packet);
}

#[test]
fn decode_rejects_wrong_hardware_type() {
    let mut encoded = sample().encode();
    encoded[1] = 6; // htype = IEEE 802 Networks
    assert!(matches!(
        ArpPacket::decode(&encoded),
        Err(DecodeError::UnexpectedHardwareType(6))
    ));
}

#[test]
fn decode_rejects_bad_opcode() {
    let mut encoded = sample().encode();
    encoded[7] = 9;
    assert!(matches!(
        ArpPacket::decode(&encoded),
        Err(DecodeError::InvalidOpcode(9))
    ));
}
