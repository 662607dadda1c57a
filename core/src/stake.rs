// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Stake records held by the forger stake registry.

use dusk_bytes::Serializable;
use serde::{Deserialize, Serialize};

use crate::keys::ForgingKeys;
use crate::serde_support::impl_hex_string;
use crate::{Address, Amount, Epoch, keccak256};

/// Number of epochs a change to the stake list takes to affect forging
/// eligibility.
pub const ACTIVATION_DELAY: Epoch = 2;

/// Identifier of a stake.
///
/// Derived from the identity of the transaction that created the stake and
/// from the registry's insertion sequence number, so that an identifier is
/// never issued twice.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StakeId([u8; 32]);

impl StakeId {
    /// Derives the identifier of the stake inserted with `sequence` by the
    /// transaction identified by `origin`.
    #[must_use]
    pub fn derive(origin: &[u8; 32], sequence: u64) -> Self {
        let mut preimage = [0u8; 40];
        preimage[..32].copy_from_slice(origin);
        preimage[32..].copy_from_slice(&sequence.to_be_bytes());
        Self(keccak256(&preimage))
    }

    /// Creates an identifier from its raw bytes.
    #[must_use]
    pub const fn from_array(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns a reference to the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Serializable<32> for StakeId {
    type Error = dusk_bytes::Error;

    fn from_bytes(buf: &[u8; 32]) -> Result<Self, Self::Error> {
        Ok(Self(*buf))
    }

    fn to_bytes(&self) -> [u8; 32] {
        self.0
    }
}

impl_hex_string!(StakeId, 32, "");

/// A stake delegated to a pair of forging keys.
///
/// The `owner` is the only account allowed to withdraw the stake, and it does
/// not need to be related to the forging keys in any way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeRecord {
    /// Identifier of the stake.
    pub stake_id: StakeId,
    /// Account entitled to withdraw the stake.
    pub owner: Address,
    /// Keys the stake authorizes to forge.
    pub forging_keys: ForgingKeys,
    /// Staked amount, in wei. Never zero.
    #[serde(with = "crate::amount")]
    pub value: Amount,
    /// Epoch in which the stake was created.
    pub created_epoch: Epoch,
}

impl StakeRecord {
    /// Creates a new stake record.
    #[must_use]
    pub const fn new(
        stake_id: StakeId,
        owner: Address,
        forging_keys: ForgingKeys,
        value: Amount,
        created_epoch: Epoch,
    ) -> Self {
        Self {
            stake_id,
            owner,
            forging_keys,
            value,
            created_epoch,
        }
    }

    /// The first epoch in which the stake can be used to forge, assuming it is
    /// not withdrawn in the meantime.
    #[must_use]
    pub const fn activation_epoch(&self) -> Epoch {
        self.created_epoch + ACTIVATION_DELAY
    }
}
