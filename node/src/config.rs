// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use forger_core::{Address, Amount};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::ChainConfig;

/// Default log_level.
const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log_type.
const DEFAULT_LOG_TYPE: &str = "coloured";

const LOG_TYPES: [&str; 3] = ["coloured", "plain", "json"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid log-level specified '{0}'")]
    LogLevel(String),
    #[error("invalid log-type specified '{0}'")]
    LogType(String),
}

/// Accounts the node holds the keys of, and the fees it pays when sending
/// transactions on their behalf.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct WalletConfig {
    pub accounts: Vec<Address>,
    pub gas_limit: u64,
    #[serde(with = "forger_core::amount")]
    pub gas_price: Amount,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            accounts: vec![],
            gas_limit: 1_000_000,
            gas_price: 1_000_000_000,
        }
    }
}

impl WalletConfig {
    pub fn owns(&self, account: &Address) -> bool {
        self.accounts.contains(account)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub log_level: Option<String>,
    pub log_type: Option<String>,
    pub log_filter: Option<String>,

    /// Path of the genesis snapshot. An empty chain is started without it.
    pub genesis: Option<PathBuf>,

    #[serde(default = "ChainConfig::default")]
    pub chain: ChainConfig,

    #[serde(default = "WalletConfig::default")]
    pub wallet: WalletConfig,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let toml = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&toml)?)
    }

    pub fn log_type(&self) -> Result<&str, ConfigError> {
        let log_type = self.log_type.as_deref().unwrap_or(DEFAULT_LOG_TYPE);
        if LOG_TYPES.contains(&log_type) {
            Ok(log_type)
        } else {
            Err(ConfigError::LogType(log_type.into()))
        }
    }

    pub fn log_level(&self) -> Result<tracing::Level, ConfigError> {
        let log_level = self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL);
        tracing::Level::from_str(log_level)
            .map_err(|_| ConfigError::LogLevel(log_level.into()))
    }

    pub fn log_filter(&self) -> String {
        self.log_filter.clone().unwrap_or_default()
    }
}
