//
// Copyright (c) The sdnc Contributors
//
// SPDX-License-Identifier: MIT
//

use bytes::TryGetError;

// Type aliases.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Decode errors shared by the Ethernet/ARP/LLDP codecs.
///
/// None of these are fatal to the controller: a malformed frame is a
/// transient observational error (spec.md §7, taxonomy #1) and the caller
/// drops it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DecodeError {
    ReadOutOfBounds,
    InvalidEthertype(u16),
    UnexpectedHardwareType(u16),
    UnexpectedProtocolType(u16),
    InvalidLengths(u8, u8),
    InvalidOpcode(u16),
    MissingTlv(TlvKind),
    UnexpectedTlvOrder,
    InvalidTlvLength(u8, u8),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TlvKind {
    ChassisId,
    PortId,
    Ttl,
    End,
}

// ===== impl DecodeError =====

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::ReadOutOfBounds => {
                write!(f, "attempt to read out of bounds")
            }
            DecodeError::InvalidEthertype(ethertype) => {
                write!(f, "unexpected ethertype: {ethertype:#06x}")
            }
            DecodeError::UnexpectedHardwareType(htype) => {
                write!(f, "unexpected ARP hardware type: {htype}")
            }
            DecodeError::UnexpectedProtocolType(ptype) => {
                write!(f, "unexpected ARP protocol type: {ptype:#06x}")
            }
            DecodeError::InvalidLengths(hlen, plen) => {
                write!(
                    f,
                    "unexpected ARP address lengths: hlen={hlen}, plen={plen}"
                )
            }
            DecodeError::InvalidOpcode(op) => {
                write!(f, "invalid ARP opcode: {op}")
            }
            DecodeError::MissingTlv(kind) => {
                write!(f, "missing LLDP TLV: {kind:?}")
            }
            DecodeError::UnexpectedTlvOrder => {
                write!(f, "LLDP TLVs out of order")
            }
            DecodeError::InvalidTlvLength(tlv_type, len) => {
                write!(
                    f,
                    "invalid LLDP TLV length: type={tlv_type}, len={len}"
                )
            }
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<TryGetError> for DecodeError {
    fn from(_error: TryGetError) -> DecodeError {
        DecodeError::ReadOutOfBounds
    }
}
