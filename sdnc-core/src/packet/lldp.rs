//
// Copyright (c) The sdnc Contributors
//
// SPDX-License-Identifier: MIT
//

//! The narrow slice of LLDP (IEEE 802.1AB) this controller speaks: four
//! TLVs carrying just enough to identify the emitting dpid and port
//! (spec.md §6). Only subtype 7 ("locally assigned") ChassisID/PortID
//! values are produced or accepted, since both ends of every link are
//! this controller's own switches.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::error::{DecodeError, DecodeResult, TlvKind};

const TLV_TYPE_CHASSIS_ID: u8 = 1;
const TLV_TYPE_PORT_ID: u8 = 2;
const TLV_TYPE_TTL: u8 = 3;
const TLV_TYPE_END: u8 = 0;

const SUBTYPE_LOCALLY_ASSIGNED: u8 = 7;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LldpPacket {
    pub chassis_dpid: u64,
    pub port_id: u32,
    pub ttl_secs: u16,
}

impl LldpPacket {
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(32);

        put_tlv_header(&mut buf, TLV_TYPE_CHASSIS_ID, 9);
        buf.put_u8(SUBTYPE_LOCALLY_ASSIGNED);
        buf.put_u64(self.chassis_dpid);

        put_tlv_header(&mut buf, TLV_TYPE_PORT_ID, 5);
        buf.put_u8(SUBTYPE_LOCALLY_ASSIGNED);
        buf.put_u32(self.port_id);

        put_tlv_header(&mut buf, TLV_TYPE_TTL, 2);
        buf.put_u16(self.ttl_secs);

        put_tlv_header(&mut buf, TLV_TYPE_END, 0);

        buf
    }

    /// Decodes the four expected TLVs in order. Any deviation — a missing
    /// TLV, a reordered one, or a truncated value — is the "malformed
    /// LLDP" case from spec.md §4.3/§7 and is reported as a decode error
    /// for the caller to silently drop.
    pub fn decode(data: &[u8]) -> DecodeResult<LldpPacket> {
        let mut buf = Bytes::copy_from_slice(data);

        let chassis_dpid = decode_chassis_id(&mut buf)?;
        let port_id = decode_port_id(&mut buf)?;
        let ttl_secs = decode_ttl(&mut buf)?;
        decode_end(&mut buf)?;

        Ok(LldpPacket {
            chassis_dpid,
            port_id,
            ttl_secs,
        })
    }
}

fn put_tlv_header(buf: &mut BytesMut, tlv_type: u8, len: u16) {
    let header = ((tlv_type as u16) << 9) | len;
    buf.put_u16(header);
}

fn get_tlv_header(buf: &mut Bytes) -> DecodeResult<(u8, u16)> {
    let header = buf.try_get_u16()?;
    Ok(((header >> 9) as u8, header & 0x01ff))
}

fn decode_chassis_id(buf: &mut Bytes) -> DecodeResult<u64> {
    let (tlv_type, len) = get_tlv_header(buf)?;
    if tlv_type != TLV_TYPE_CHASSIS_ID {
        return Err(DecodeError::MissingTlv(TlvKind::ChassisId));
    }
    if len != 9 {
        return Err(DecodeError::InvalidTlvLength(tlv_type, len as u8));
    }
    let subtype = buf.try_get_u8()?;
    let dpid = buf.try_get_u64()?;
    if subtype != SUBTYPE_LOCALLY_ASSIGNED || dpid == 0 {
        return Err(DecodeError::MissingTlv(TlvKind::ChassisId));
    }
    Ok(dpid)
}

fn decode_port_id(buf: &mut Bytes) -> DecodeResult<u32> {
    let (tlv_type, len) = get_tlv_header(buf)?;
    if tlv_type != TLV_TYPE_PORT_ID {
        return Err(DecodeError::MissingTlv(TlvKind::PortId));
    }
    if len != 5 {
        return Err(DecodeError::InvalidTlvLength(tlv_type, len as u8));
    }
    let subtype = buf.try_get_u8()?;
    let port = buf.try_get_u32()?;
    if subtype != SUBTYPE_LOCALLY_ASSIGNED || port == 0 {
        return Err(DecodeError::MissingTlv(TlvKind::PortId));
    }
    Ok(port)
}

fn decode_ttl(buf: &mut Bytes) -> DecodeResult<u16> {
    let (tlv_type, len) = get_tlv_header(buf)?;
    if tlv_type != TLV_TYPE_TTL {
        return Err(DecodeError::MissingTlv(TlvKind::Ttl));
    }
    if len != 2 {
        return Err(DecodeError::InvalidTlvLength(tlv_type, len as u8));
    }
    Ok(buf.try_get_u16()?)
}

fn decode_end(buf: &mut Bytes) -> DecodeResult<()> {
    let (tlv_type, len) = get_tlv_header(buf)?;
    if tlv_type != TLV_TYPE_END || len != 0 {
        return Err(DecodeError::MissingTlv(TlvKind::End));
    }
    Ok(())
}
