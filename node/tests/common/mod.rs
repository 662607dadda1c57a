// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

#![allow(dead_code)]

use dusk_bytes::Serializable;
use forger_core::keys::{BlockSignPublicKey, ForgingKeys, VrfPublicKey};
use forger_core::{Address, Amount};
use forger_node::NodeApi;
use forger_node::api::MakeForgerStake;
use forger_node::chain::genesis::{GenesisStake, Snapshot};
use forger_node::chain::{Chain, ChainConfig};
use forger_node::config::WalletConfig;
use forger_node::transaction::Receipt;
use rand::{Rng, RngCore};

pub const GAS_LIMIT: u64 = 1_000_000;
pub const GAS_PRICE: Amount = 1_000_000_000;

pub fn random_address<R: RngCore>(rng: &mut R) -> Address {
    Address::from_array(rng.r#gen())
}

pub fn random_keys<R: RngCore>(rng: &mut R) -> ForgingKeys {
    let mut vrf = [0u8; 33];
    rng.fill_bytes(&mut vrf);
    vrf[0] = 0x03;
    ForgingKeys::new(
        BlockSignPublicKey::from_array(rng.r#gen()),
        VrfPublicKey::from_bytes(&vrf).expect("tagged key is valid"),
    )
}

pub fn wallet(accounts: &[Address]) -> WalletConfig {
    WalletConfig {
        accounts: accounts.to_vec(),
        gas_limit: GAS_LIMIT,
        gas_price: GAS_PRICE,
    }
}

pub fn genesis_stake(
    owner: Address,
    keys: &ForgingKeys,
    zennies: u64,
) -> GenesisStake {
    GenesisStake {
        owner,
        block_sign_public_key: keys.block_sign_public_key,
        vrf_public_key: keys.vrf_public_key,
        zennies,
        tx_hash: None,
    }
}

pub fn start(genesis: &Snapshot, blocks_per_epoch: u64) -> Chain {
    let config = ChainConfig {
        blocks_per_epoch,
        ..ChainConfig::default()
    };
    Chain::new(config, genesis).expect("genesis should be valid")
}

pub fn stake_request(
    from: Address,
    owner: Address,
    keys: &ForgingKeys,
    value_in_zennies: i64,
) -> MakeForgerStake {
    MakeForgerStake {
        from,
        owner_address: owner,
        block_sign_public_key: keys.block_sign_public_key.to_string(),
        vrf_public_key: keys.vrf_public_key.to_string(),
        value_in_zennies,
    }
}

/// Forges a block with `forger` and returns the receipts it includes.
pub fn forge(
    node: &NodeApi,
    forger: &ForgingKeys,
    force_switch_to_next_epoch: bool,
) -> Vec<Receipt> {
    let height = node
        .generate_block(forger, force_switch_to_next_epoch)
        .expect("forger should be eligible");
    node.block_receipts(height)
}

pub fn fee(receipt: &Receipt) -> Amount {
    Amount::from(receipt.gas_used) * GAS_PRICE
}

pub fn balance(node: &NodeApi, account: &Address) -> Amount {
    use forger_stake_contract::Host;
    node.chain().read().state().balance(account)
}
