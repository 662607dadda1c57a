// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Types used for interacting with the forger stake registry.
//!
//! The registry is a native contract living at [`FORGER_STAKE_CONTRACT`]. It
//! keeps a list of [`stake::StakeRecord`]s, each one funding a pair of
//! [`keys::ForgingKeys`] that become eligible to forge blocks after the
//! activation delay.

#![warn(missing_docs)]

pub mod abi;
pub mod events;
pub mod keys;
pub mod stake;

mod address;
mod error;
mod serde_support;

pub use address::Address;
pub use error::Error;
pub use serde_support::amount;

use sha3::{Digest, Keccak256};

/// Amount of funds, denominated in wei.
pub type Amount = u128;

/// Consensus epoch number.
pub type Epoch = u64;

/// Number of zennies in one zen.
pub const ZENNIES_PER_ZEN: u64 = 100_000_000;

/// Number of wei in one zenny.
pub const WEI_PER_ZENNY: Amount = 10_000_000_000;

/// Address of the forger stake registry.
pub const FORGER_STAKE_CONTRACT: Address = native_address(0x22);

/// Address of the withdrawal request native contract.
pub const WITHDRAWAL_REQ_CONTRACT: Address = native_address(0x11);

/// All the native contracts known to the chain. None of them may own a stake.
pub const NATIVE_CONTRACTS: [Address; 2] =
    [WITHDRAWAL_REQ_CONTRACT, FORGER_STAKE_CONTRACT];

/// Native contracts have ten leading zero bytes followed by ten repetitions of
/// the same byte.
const fn native_address(fill: u8) -> Address {
    let mut bytes = [fill; Address::SIZE];
    let mut i = 0;
    while i < Address::SIZE / 2 {
        bytes[i] = 0;
        i += 1;
    }
    Address::from_array(bytes)
}

/// Converts zennies into wei.
#[must_use]
pub const fn zennies_to_wei(zennies: u64) -> Amount {
    zennies as Amount * WEI_PER_ZENNY
}

/// Converts whole zen into wei.
#[must_use]
pub const fn zen(value: u64) -> Amount {
    zennies_to_wei(value) * ZENNIES_PER_ZEN as Amount
}

/// Converts wei into zennies, returning `None` if the amount is not a whole
/// number of zennies or does not fit.
#[must_use]
pub fn wei_to_zennies(wei: Amount) -> Option<u64> {
    if wei % WEI_PER_ZENNY != 0 {
        return None;
    }
    u64::try_from(wei / WEI_PER_ZENNY).ok()
}

/// Keccak-256 digest of the given bytes.
#[must_use]
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}
