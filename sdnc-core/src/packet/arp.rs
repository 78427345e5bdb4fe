//
// Copyright (c) The sdnc Contributors
//
// SPDX-License-Identifier: MIT
//

//! ARP packet layout (RFC 826), restricted to Ethernet/IPv4 — the only
//! combination the southbound stack ever delivers (spec.md §6).

use std::net::Ipv4Addr;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use sdnc_utils::MacAddr;

use super::error::{DecodeError, DecodeResult};

pub const HTYPE_ETHERNET: u16 = 1;
pub const PTYPE_IPV4: u16 = 0x0800;

pub const OP_REQUEST: u16 = 1;
pub const OP_REPLY: u16 = 2;

pub const LENGTH: usize = 28;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ArpPacket {
    pub op: u16,
    pub sender_mac: MacAddr,
    pub sender_ip: Ipv4Addr,
    pub target_mac: MacAddr,
    pub target_ip: Ipv4Addr,
}

impl ArpPacket {
    pub fn is_request(&self) -> bool {
        self.op == OP_REQUEST
    }

    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(LENGTH);
        buf.put_u16(HTYPE_ETHERNET);
        buf.put_u16(PTYPE_IPV4);
        buf.put_u8(MacAddr::LENGTH as u8);
        buf.put_u8(4);
        buf.put_u16(self.op);
        buf.put_slice(&self.sender_mac.as_bytes());
        buf.put_slice(&self.sender_ip.octets());
        buf.put_slice(&self.target_mac.as_bytes());
        buf.put_slice(&self.target_ip.octets());
        buf
    }

    pub fn decode(data: &[u8]) -> DecodeResult<ArpPacket> {
        if data.len() < LENGTH {
            return Err(DecodeError::ReadOutOfBounds);
        }
        let mut buf = Bytes::copy_from_slice(data);

        let htype = buf.try_get_u16()?;
        let ptype = buf.try_get_u16()?;
        if htype != HTYPE_ETHERNET {
            return Err(DecodeError::UnexpectedHardwareType(htype));
        }
        if ptype != PTYPE_IPV4 {
            return Err(DecodeError::UnexpectedProtocolType(ptype));
        }
        let hlen = buf.try_get_u8()?;
        let plen = buf.try_get_u8()?;
        if hlen as usize != MacAddr::LENGTH || plen != 4 {
            return Err(DecodeError::InvalidLengths(hlen, plen));
        }
        let op = buf.try_get_u16()?;
        if op != OP_REQUEST && op != OP_REPLY {
            return Err(DecodeError::InvalidOpcode(op));
        }

        let mut sender_mac = [0u8; 6];
        buf.try_copy_to_slice(&mut sender_mac)?;
        let sender_ip = Ipv4Addr::from(buf.try_get_u32()?);
        let mut target_mac = [0u8; 6];
        buf.try_copy_to_slice(&mut target_mac)?;
        let target_ip = Ipv4Addr::from(buf.try_get_u32()?);

        Ok(ArpPacket {
            op,
            sender_mac: MacAddr::from(sender_mac),
            sender_ip,
            target_mac: MacAddr::from(target_mac),
            target_ip,
        })
    }
}
