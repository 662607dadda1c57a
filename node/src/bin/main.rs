// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

mod args;
mod log;

use std::io::Write;

use clap::Parser;
use forger_node::chain::genesis::Snapshot;
use forger_node::scenario::Scenario;
use forger_node::{Chain, NodeApi};
use tracing::info;

use crate::args::{Args, Command};
use crate::log::Log;

pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = args.config()?;

    Log::new(
        config.log_level()?,
        config.log_filter(),
        config.log_type()?.to_string(),
    )
    .register()?;

    let genesis = match &config.genesis {
        Some(path) => {
            info!(event = "loading genesis", path = %path.display());
            Snapshot::from_file(path)?
        }
        None => Snapshot::default(),
    };
    let chain = Chain::new(config.chain, &genesis)?;
    let api = NodeApi::new(chain, config.wallet.clone());

    let mut out = std::io::stdout().lock();
    match args.command {
        Command::Replay { scenario } => {
            let scenario = Scenario::from_file(&scenario)?;
            for outcome in scenario.run(&api) {
                serde_json::to_writer(&mut out, &outcome)?;
                writeln!(out)?;
            }
        }
        Command::Genesis => {
            let stakes = api.all_forging_stakes()?;
            let forgers = api.forging_stake_info(Some(0))?;
            let summary = serde_json::json!({
                "stakes": stakes,
                "forgers": forgers,
            });
            serde_json::to_writer_pretty(&mut out, &summary)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
