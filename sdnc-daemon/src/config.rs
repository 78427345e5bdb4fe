//
// Copyright (c) The sdnc Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv4Addr;

use serde::Deserialize;

use sdnc_utils::{ControllerConfig, MacAddr};

/// On-disk configuration: the process-wide controller constants plus an
/// optional static host seed (spec.md §6 `HLT_SEED`).
// `deny_unknown_fields` is intentionally omitted here: it does not compose
// with `#[serde(flatten)]` (serde/#1547), and `ControllerConfig` itself
// already denies unknown fields among its own keys.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(flatten)]
    pub controller: ControllerConfig,
    pub hlt_seed: Vec<HostSeed>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostSeed {
    pub ipv4: Ipv4Addr,
    pub mac: MacAddr,
    pub dpid: u64,
    pub port: u16,
}

impl Config {
    const DFLT_FILEPATH: &'static str = "/etc/sdnc/sdnc.toml";

    pub fn load(config_file: Option<&str>) -> Config {
        let config_file = config_file.unwrap_or(Config::DFLT_FILEPATH);

        match std::fs::read_to_string(config_file) {
            Ok(config_str) => toml::from_str(&config_str)
                .expect("failed to parse configuration file"),
            Err(err) => {
                eprintln!("failed to load configuration file: {err}");
                eprintln!("falling back to default configuration...");
                Config::default()
            }
        }
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            controller: ControllerConfig::default(),
            hlt_seed: Vec::new(),
        }
    }
}
