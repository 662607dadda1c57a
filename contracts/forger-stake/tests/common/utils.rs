// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use dusk_bytes::Serializable;
use forger_core::abi::ForgerStakeCall;
use forger_core::keys::{BlockSignPublicKey, ForgingKeys, VrfPublicKey};
use forger_core::stake::StakeId;
use forger_core::{Address, Amount};
use forger_stake_contract::{CallReceipt, ForgerStakeContract, Message};
use rand::{Rng, RngCore};

use super::host::TestHost;

pub const GAS_LIMIT: u64 = 1_000_000;

pub fn random_address<R: RngCore>(rng: &mut R) -> Address {
    Address::from_array(rng.r#gen())
}

pub fn random_keys<R: RngCore>(rng: &mut R) -> ForgingKeys {
    let mut vrf = [0u8; 33];
    rng.fill_bytes(&mut vrf);
    vrf[0] = if rng.r#gen() { 0x02 } else { 0x03 };
    ForgingKeys::new(
        BlockSignPublicKey::from_array(rng.r#gen()),
        VrfPublicKey::from_bytes(&vrf).expect("tagged key is valid"),
    )
}

pub fn random_origin<R: RngCore>(rng: &mut R) -> [u8; 32] {
    rng.r#gen()
}

pub fn delegate<R: RngCore>(
    rng: &mut R,
    contract: &mut ForgerStakeContract,
    host: &mut TestHost,
    caller: Address,
    owner: Address,
    forging_keys: ForgingKeys,
    value: Amount,
) -> CallReceipt {
    let call = ForgerStakeCall::Delegate {
        forging_keys,
        owner,
    };
    let msg = Message::new(caller, &call, GAS_LIMIT, random_origin(rng))
        .with_value(value);
    contract
        .execute(host, &msg)
        .expect("delegation should not fail fatally")
}

pub fn withdraw<R: RngCore>(
    rng: &mut R,
    contract: &mut ForgerStakeContract,
    host: &mut TestHost,
    caller: Address,
    stake_id: StakeId,
) -> CallReceipt {
    let call = ForgerStakeCall::Withdraw { stake_id };
    let msg = Message::new(caller, &call, GAS_LIMIT, random_origin(rng));
    contract
        .execute(host, &msg)
        .expect("withdrawal should not fail fatally")
}

/// Returns the id of the stake created by a successful delegation.
pub fn stake_id(receipt: &CallReceipt) -> StakeId {
    let data = receipt
        .data
        .as_ref()
        .expect("delegation should succeed");
    StakeId::from_array(
        data.as_slice()
            .try_into()
            .expect("delegation returns a 32-byte id"),
    )
}
