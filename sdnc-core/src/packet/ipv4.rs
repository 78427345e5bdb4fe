//
// Copyright (c) The sdnc Contributors
//
// SPDX-License-Identifier: MIT
//

//! The two IPv4 header fields the Reactive Router consults (spec.md §9:
//! "only the fields enumerated in §6 are consulted"); the header is
//! otherwise unparsed.

use std::net::Ipv4Addr;

use bytes::{Buf, Bytes};

const MIN_HEADER_LEN: usize = 20;

/// Extracts `(src, dst)` from an IPv4 header, or `None` if the payload is
/// too short or not IPv4.
pub fn parse_addrs(payload: &[u8]) -> Option<(Ipv4Addr, Ipv4Addr)> {
    if payload.len() < MIN_HEADER_LEN {
        return None;
    }
    let mut buf = Bytes::copy_from_slice(&payload[..MIN_HEADER_LEN]);
    let version_ihl = buf.get_u8();
    if version_ihl >> 4 != 4 {
        return None;
    }
    buf.advance(11); // skip to source address (offset 12)
    let src = Ipv4Addr::from(buf.get_u32());
    let dst = Ipv4Addr::from(buf.get_u32());
    Some((src, dst))
}
