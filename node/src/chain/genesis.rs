// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Genesis snapshot, describing the state the chain starts from.

use std::fmt::Debug;
use std::path::Path;

use forger_core::keys::{BlockSignPublicKey, ForgingKeys, VrfPublicKey};
use forger_core::stake::StakeId;
use forger_core::{Address, keccak256, zennies_to_wei};
use forger_stake_contract::{Abort, ForgerStakeContract, HostError};
use serde::{Deserialize, Serialize};
use serde_with::hex::Hex;
use serde_with::serde_as;
use thiserror::Error;
use tracing::info;

use crate::state::WorldState;

#[derive(Debug, Error)]
pub enum GenesisError {
    #[error("cannot read genesis file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid genesis file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid genesis balance: {0}")]
    Balance(#[from] HostError),
    #[error("invalid genesis stake #{index}: {reason:?}")]
    Stake { index: usize, reason: Abort },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub address: Address,
    pub zennies: u64,
}

/// A stake created together with the chain.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GenesisStake {
    pub owner: Address,
    pub block_sign_public_key: BlockSignPublicKey,
    pub vrf_public_key: VrfPublicKey,
    pub zennies: u64,
    /// Hash of the transaction that created the chain. The stake id is
    /// derived from it.
    #[serde_as(as = "Option<Hex>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<[u8; 32]>,
}

impl GenesisStake {
    pub fn forging_keys(&self) -> ForgingKeys {
        ForgingKeys::new(self.block_sign_public_key, self.vrf_public_key)
    }

    fn origin(&self, index: usize) -> [u8; 32] {
        self.tx_hash.unwrap_or_else(|| {
            let mut seed = b"genesis".to_vec();
            seed.extend_from_slice(&(index as u64).to_be_bytes());
            keccak256(&seed)
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    pub address: Address,
}

#[derive(Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Snapshot {
    // This "serde skip" workaround seems needed as per
    // https://github.com/toml-rs/toml-rs/issues/384
    #[serde(skip_serializing_if = "Vec::is_empty", default = "Vec::new")]
    balance: Vec<Balance>,
    #[serde(skip_serializing_if = "Vec::is_empty", default = "Vec::new")]
    stake: Vec<GenesisStake>,
    #[serde(skip_serializing_if = "Vec::is_empty", default = "Vec::new")]
    contract: Vec<Contract>,
}

impl Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let toml = toml::to_string(self).map_err(|e| {
            let _ = writeln!(f, "{e}");
            std::fmt::Error
        })?;
        f.write_str(&toml)
    }
}

impl Snapshot {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GenesisError> {
        let toml = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&toml)?)
    }

    pub fn with_balance(mut self, address: Address, zennies: u64) -> Self {
        self.balance.push(Balance { address, zennies });
        self
    }

    pub fn with_stake(mut self, stake: GenesisStake) -> Self {
        self.stake.push(stake);
        self
    }

    pub fn with_contract(mut self, address: Address) -> Self {
        self.contract.push(Contract { address });
        self
    }

    /// Returns an iterator of the balances included in this snapshot
    pub fn balances(&self) -> impl Iterator<Item = &Balance> {
        self.balance.iter()
    }

    /// Returns an iterator of the stakes included in this snapshot.
    pub fn stakes(&self) -> impl Iterator<Item = &GenesisStake> {
        self.stake.iter()
    }

    /// Returns an iterator of the accounts holding code.
    pub fn contracts(&self) -> impl Iterator<Item = &Address> {
        self.contract.iter().map(|c| &c.address)
    }

    /// Writes the snapshot into an empty state and registry.
    pub fn apply(
        &self,
        state: &mut WorldState,
        registry: &mut ForgerStakeContract,
    ) -> Result<Vec<StakeId>, GenesisError> {
        for address in self.contracts() {
            state.deploy_contract(address);
        }
        for balance in self.balances() {
            state.mint(&balance.address, zennies_to_wei(balance.zennies))?;
        }

        let mut ids = Vec::with_capacity(self.stake.len());
        for (index, stake) in self.stakes().enumerate() {
            let stake_id = registry
                .add_genesis_stake(
                    state,
                    &stake.origin(index),
                    stake.owner,
                    stake.forging_keys(),
                    zennies_to_wei(stake.zennies),
                )
                .map_err(|reason| GenesisError::Stake { index, reason })?;
            ids.push(stake_id);
        }
        state.commit();

        info!(
            event = "genesis applied",
            balances = self.balance.len(),
            stakes = ids.len(),
            contracts = self.contract.len(),
        );
        Ok(ids)
    }
}
