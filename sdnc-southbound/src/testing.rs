//
// Copyright (c) The sdnc Contributors
//
// SPDX-License-Identifier: MIT
//

//! A loopback southbound transport used by `sdnc-core`'s tests and by this
//! crate's own tests. It never talks to a real switch: messages sent
//! through a [`ConnectionHandle`] built here are captured in an
//! [`mpsc::UnboundedReceiver`] the test can drain.

use tokio::sync::mpsc;

use crate::{ConnectionHandle, SouthboundMsg};
use sdnc_utils::Dpid;

/// Builds a connected pair: a handle components can send through, and the
/// receiver end a test can drain to assert on what was sent.
pub fn fake_connection(
    dpid: Dpid,
) -> (ConnectionHandle, mpsc::UnboundedReceiver<SouthboundMsg>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ConnectionHandle::new(dpid, tx), rx)
}
