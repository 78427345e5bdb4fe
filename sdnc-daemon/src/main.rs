//
// Copyright (c) The sdnc Contributors
//
// SPDX-License-Identifier: MIT
//

#![warn(rust_2018_idioms)]

mod config;

use clap::{App, Arg};
use config::Config;
use sdnc_core::{hlt::HostRecord, Controller};
use sdnc_southbound::{Dispatcher, SouthboundEvent};
use tokio::sync::mpsc;
use tracing::info;

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive("sdnc=info".parse().unwrap())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}

/// Drains southbound events and fans each one out through `dispatcher`
/// until the channel closes or a shutdown signal arrives.
///
/// The channel's sending half is owned by the southbound adapter: an
/// out-of-scope external collaborator (spec.md §1) that speaks the actual
/// OpenFlow-style wire protocol to connected switches and translates it
/// into [`SouthboundEvent`]s. This loop is the seam `sdnc-daemon` offers
/// it.
async fn run(
    dispatcher: Dispatcher,
    mut events: mpsc::UnboundedReceiver<SouthboundEvent>,
) {
    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(event) => dispatcher.dispatch(&event).await,
                    None => {
                        info!("southbound event channel closed, shutting down");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("received shutdown signal");
                break;
            }
        }
    }
}

fn main() {
    let matches = App::new("sdnc")
        .version(clap::crate_version!())
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("file")
                .help("Specify an alternative configuration file."),
        )
        .get_matches();

    let config_file = matches.value_of("config");
    let config = Config::load(config_file);

    init_tracing();

    let controller = Controller::new(config.controller);
    controller.seed_hosts(config.hlt_seed.into_iter().map(|seed| {
        HostRecord {
            dpid: sdnc_utils::Dpid(seed.dpid),
            port: seed.port,
            mac: seed.mac,
            ip: seed.ipv4,
        }
    }));

    let dispatcher = controller.register();

    // `_events_tx` is the handle an embedded southbound adapter would hold
    // to feed this process events; none is wired up here since the
    // adapter itself is out of scope (spec.md §1).
    let (_events_tx, events_rx) = mpsc::unbounded_channel();

    info!("starting up");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to create async runtime")
        .block_on(run(dispatcher, events_rx));
}
