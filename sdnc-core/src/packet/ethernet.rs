//
// Copyright (c) The sdnc Contributors
//
// SPDX-License-Identifier: MIT
//

//! Minimal Ethernet II framing: just enough of the header to demux LLDP,
//! ARP, and IPv4 (spec.md §6, §9: "use a straightforward binary decoder
//! for Ethernet + ARP + LLDP TLVs; only the fields enumerated in §6 are
//! consulted").

use bytes::{Buf, BufMut, Bytes, BytesMut};

use sdnc_utils::MacAddr;

use super::error::{DecodeError, DecodeResult};

pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_ARP: u16 = 0x0806;
pub const ETHERTYPE_LLDP: u16 = 0x88cc;

pub const HEADER_LEN: usize = 14;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EthernetFrame {
    pub dst: MacAddr,
    pub src: MacAddr,
    pub ethertype: u16,
    pub payload: Bytes,
}

impl EthernetFrame {
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(HEADER_LEN + self.payload.len());
        buf.put_slice(&self.dst.as_bytes());
        buf.put_slice(&self.src.as_bytes());
        buf.put_u16(self.ethertype);
        buf.put_slice(&self.payload);
        buf
    }

    pub fn decode(data: &[u8]) -> DecodeResult<EthernetFrame> {
        if data.len() < HEADER_LEN {
            return Err(DecodeError::ReadOutOfBounds);
        }
        let mut buf = Bytes::copy_from_slice(data);

        let mut dst = [0u8; 6];
        buf.try_copy_to_slice(&mut dst)?;
        let mut src = [0u8; 6];
        buf.try_copy_to_slice(&mut src)?;
        let ethertype = buf.try_get_u16()?;

        Ok(EthernetFrame {
            dst: MacAddr::from(dst),
            src: MacAddr::from(src),
            ethertype,
            payload: buf,
        })
    }
}
