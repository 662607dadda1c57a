// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Logs emitted by the forger stake registry.

use serde::{Deserialize, Serialize};

use crate::abi::{WORD_SIZE, Word, amount_to_word, read_word, word_to_amount};
use crate::stake::StakeId;
use crate::{Address, Amount, Error, keccak256};

/// Signature of the event emitted on a successful delegation.
pub const DELEGATE_EVENT: &str =
    "DelegateForgerStake(address,address,bytes32,uint256)";

/// Signature of the event emitted on a successful withdrawal.
pub const WITHDRAW_EVENT: &str = "WithdrawForgerStake(address,bytes32)";

/// A log record: the emitting contract, its topics and an opaque payload.
///
/// The first topic is always the Keccak-256 digest of the event signature.
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// Contract that emitted the log.
    pub address: Address,
    /// Indexed topics.
    #[serde_as(as = "Vec<serde_with::hex::Hex>")]
    pub topics: Vec<Word>,
    /// ABI encoded payload.
    #[serde_as(as = "serde_with::hex::Hex")]
    pub data: Vec<u8>,
}

/// Topic identifying an event signature.
#[must_use]
pub fn signature_topic(signature: &str) -> Word {
    keccak256(signature.as_bytes())
}

/// A new stake was delegated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakeDelegated {
    /// Account that funded the stake.
    pub from: Address,
    /// Owner of the new stake.
    pub owner: Address,
    /// Identifier of the new stake.
    pub stake_id: StakeId,
    /// Staked amount.
    pub value: Amount,
}

impl StakeDelegated {
    /// Builds the log emitted by `contract` for this event.
    #[must_use]
    pub fn to_log(&self, contract: Address) -> Log {
        let mut data = Vec::with_capacity(2 * WORD_SIZE);
        data.extend_from_slice(self.stake_id.as_bytes());
        data.extend_from_slice(&amount_to_word(self.value));
        Log {
            address: contract,
            topics: vec![
                signature_topic(DELEGATE_EVENT),
                self.from.to_word(),
                self.owner.to_word(),
            ],
            data,
        }
    }

    /// Parses the event out of a log.
    ///
    /// # Errors
    /// If the log does not carry a delegation event.
    pub fn from_log(log: &Log) -> Result<Self, Error> {
        const NAME: &str = "DelegateForgerStake";
        match log.topics.as_slice() {
            [sig, from, owner] if *sig == signature_topic(DELEGATE_EVENT) => {
                if log.data.len() != 2 * WORD_SIZE {
                    return Err(Error::UnexpectedEvent(NAME));
                }
                Ok(Self {
                    from: Address::from_word(from)?,
                    owner: Address::from_word(owner)?,
                    stake_id: StakeId::from_array(read_word(&log.data, 0)?),
                    value: word_to_amount(&read_word(&log.data, WORD_SIZE)?)?,
                })
            }
            _ => Err(Error::UnexpectedEvent(NAME)),
        }
    }
}

/// A stake was withdrawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakeWithdrawn {
    /// Owner of the withdrawn stake, who received its value.
    pub owner: Address,
    /// Identifier of the withdrawn stake.
    pub stake_id: StakeId,
}

impl StakeWithdrawn {
    /// Builds the log emitted by `contract` for this event.
    #[must_use]
    pub fn to_log(&self, contract: Address) -> Log {
        Log {
            address: contract,
            topics: vec![signature_topic(WITHDRAW_EVENT), self.owner.to_word()],
            data: self.stake_id.as_bytes().to_vec(),
        }
    }

    /// Parses the event out of a log.
    ///
    /// # Errors
    /// If the log does not carry a withdrawal event.
    pub fn from_log(log: &Log) -> Result<Self, Error> {
        const NAME: &str = "WithdrawForgerStake";
        match log.topics.as_slice() {
            [sig, owner] if *sig == signature_topic(WITHDRAW_EVENT) => {
                if log.data.len() != WORD_SIZE {
                    return Err(Error::UnexpectedEvent(NAME));
                }
                Ok(Self {
                    owner: Address::from_word(owner)?,
                    stake_id: StakeId::from_array(read_word(&log.data, 0)?),
                })
            }
            _ => Err(Error::UnexpectedEvent(NAME)),
        }
    }
}
