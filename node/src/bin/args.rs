// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};

use forger_node::Config;

#[derive(Parser, Debug)]
#[command(version, about = "Forger stake registry node")]
pub struct Args {
    /// Configuration file path
    #[clap(long, short, env = "FORGER_CONFIG_TOML", value_parser)]
    pub config: Option<PathBuf>,

    /// Output log level
    #[clap(long)]
    pub log_level: Option<tracing::Level>,

    // Change the log format accordingly
    #[clap(
        long,
        value_parser = PossibleValuesParser::new(["coloured", "plain", "json"])
    )]
    pub log_type: Option<String>,

    /// Add log filter(s)
    #[clap(long)]
    pub log_filter: Option<String>,

    /// Genesis snapshot path, overriding the one of the config file
    #[clap(long, env = "FORGER_GENESIS_TOML", value_parser)]
    pub genesis: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replays a scenario of management commands, printing the outcome of
    /// each step as a JSON line
    Replay {
        /// Scenario file
        #[clap(value_parser)]
        scenario: PathBuf,
    },
    /// Prints the genesis stakes and the forgers of the first epoch
    Genesis,
}

impl Args {
    /// Loads the config file, if any, and overrides it with the arguments.
    pub fn config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        // Overwrite config log-level
        if let Some(log_level) = self.log_level {
            config.log_level = Some(log_level.to_string());
        }

        // Overwrite config log-type
        if let Some(log_type) = &self.log_type {
            config.log_type = Some(log_type.into());
        }

        // Overwrite config log-filter
        if let Some(log_filter) = &self.log_filter {
            config.log_filter = Some(log_filter.into());
        }

        if let Some(genesis) = &self.genesis {
            config.genesis = Some(genesis.clone());
        }

        Ok(config)
    }
}
