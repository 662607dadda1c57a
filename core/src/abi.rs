// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Call data understood by the forger stake registry.
//!
//! Calls are encoded the way EVM contracts expect them: the first four bytes
//! of the Keccak-256 digest of the method signature, followed by the
//! arguments as 32-byte words.

use dusk_bytes::Serializable;
use serde::{Deserialize, Serialize};

use crate::keys::{BlockSignPublicKey, ForgingKeys, VrfPublicKey};
use crate::stake::{StakeId, StakeRecord};
use crate::{Address, Amount, Error, keccak256};

/// Size of an ABI word.
pub const WORD_SIZE: usize = 32;

/// A single ABI word.
pub type Word = [u8; WORD_SIZE];

/// Method selector.
pub type Selector = [u8; 4];

/// Signature of the method listing all stakes.
pub const GET_ALL_FORGERS_STAKES: &str = "getAllForgersStakes()";

/// Signature of the delegation method: block sign key, the first 32 bytes of
/// the VRF key, its last byte, and the owner.
pub const DELEGATE: &str = "delegate(bytes32,bytes32,bytes1,address)";

/// Signature of the withdrawal method.
pub const WITHDRAW: &str = "withdraw(bytes32)";

/// Number of words used to encode a stake in the list returned by
/// [`GET_ALL_FORGERS_STAKES`].
pub const STAKE_WORDS: usize = 6;

/// Computes the selector of a method signature.
#[must_use]
pub fn selector(signature: &str) -> Selector {
    let digest = keccak256(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Encodes an amount as a big-endian `uint256` word.
#[must_use]
pub fn amount_to_word(value: Amount) -> Word {
    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - 16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Decodes a `uint256` word, failing if it does not fit an [`Amount`].
///
/// # Errors
/// If any of the upper 16 bytes is set.
pub fn word_to_amount(word: &Word) -> Result<Amount, Error> {
    let (high, low) = word.split_at(WORD_SIZE - 16);
    if high.iter().any(|b| *b != 0) {
        return Err(Error::InvalidData);
    }
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(low);
    Ok(Amount::from_be_bytes(bytes))
}

/// Reads the word starting at `offset`.
///
/// # Errors
/// If the data is too short.
pub fn read_word(data: &[u8], offset: usize) -> Result<Word, Error> {
    let end = offset + WORD_SIZE;
    let bytes = data
        .get(offset..end)
        .ok_or(Error::BadLength(data.len(), end))?;
    let mut word = [0u8; WORD_SIZE];
    word.copy_from_slice(bytes);
    Ok(word)
}

/// A call to the forger stake registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForgerStakeCall {
    /// List all the live stakes, in insertion order.
    GetAllForgersStakes,
    /// Delegate the transferred value to `forging_keys`, owned by `owner`.
    Delegate {
        /// Keys the new stake funds.
        forging_keys: ForgingKeys,
        /// Account entitled to withdraw the new stake.
        owner: Address,
    },
    /// Withdraw a stake owned by the caller.
    Withdraw {
        /// Stake to withdraw.
        stake_id: StakeId,
    },
}

impl ForgerStakeCall {
    /// Encodes the call as call data.
    #[must_use]
    pub fn to_call_data(&self) -> Vec<u8> {
        match self {
            Self::GetAllForgersStakes => {
                selector(GET_ALL_FORGERS_STAKES).to_vec()
            }
            Self::Delegate {
                forging_keys,
                owner,
            } => {
                let (vrf_head, vrf_last) =
                    forging_keys.vrf_public_key.split();
                let mut vrf_tail = [0u8; WORD_SIZE];
                vrf_tail[0] = vrf_last;

                let mut data = Vec::with_capacity(4 + 4 * WORD_SIZE);
                data.extend_from_slice(&selector(DELEGATE));
                data.extend_from_slice(
                    &forging_keys.block_sign_public_key.to_bytes(),
                );
                data.extend_from_slice(&vrf_head);
                data.extend_from_slice(&vrf_tail);
                data.extend_from_slice(&owner.to_word());
                data
            }
            Self::Withdraw { stake_id } => {
                let mut data = Vec::with_capacity(4 + WORD_SIZE);
                data.extend_from_slice(&selector(WITHDRAW));
                data.extend_from_slice(stake_id.as_bytes());
                data
            }
        }
    }

    /// Decodes call data.
    ///
    /// # Errors
    /// If the selector is unknown, the arguments have the wrong length, or any
    /// argument is not a valid value of its type.
    pub fn from_call_data(data: &[u8]) -> Result<Self, Error> {
        if data.len() < 4 {
            return Err(Error::BadLength(data.len(), 4));
        }
        let (sel, args) = data.split_at(4);
        let sel: Selector = [sel[0], sel[1], sel[2], sel[3]];

        if sel == selector(GET_ALL_FORGERS_STAKES) {
            expect_len(args, 0)?;
            Ok(Self::GetAllForgersStakes)
        } else if sel == selector(DELEGATE) {
            expect_len(args, 4 * WORD_SIZE)?;
            let block_sign = read_word(args, 0)?;
            let vrf_head = read_word(args, WORD_SIZE)?;
            let vrf_tail = read_word(args, 2 * WORD_SIZE)?;
            if vrf_tail[1..].iter().any(|b| *b != 0) {
                return Err(Error::InvalidWord(2 * WORD_SIZE));
            }
            let owner = Address::from_word(&read_word(args, 3 * WORD_SIZE)?)
                .map_err(|_| Error::InvalidWord(3 * WORD_SIZE))?;

            let forging_keys = ForgingKeys::new(
                BlockSignPublicKey::from_array(block_sign),
                VrfPublicKey::join(&vrf_head, vrf_tail[0])
                    .map_err(|_| Error::InvalidWord(WORD_SIZE))?,
            );
            Ok(Self::Delegate {
                forging_keys,
                owner,
            })
        } else if sel == selector(WITHDRAW) {
            expect_len(args, WORD_SIZE)?;
            let stake_id = StakeId::from_array(read_word(args, 0)?);
            Ok(Self::Withdraw { stake_id })
        } else {
            Err(Error::UnknownSelector(sel))
        }
    }
}

fn expect_len(args: &[u8], expected: usize) -> Result<(), Error> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(Error::BadLength(args.len(), expected))
    }
}

/// Stake as returned by [`GET_ALL_FORGERS_STAKES`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiStake {
    /// Identifier of the stake.
    pub stake_id: StakeId,
    /// Keys the stake funds.
    pub forging_keys: ForgingKeys,
    /// Owner of the stake.
    pub owner: Address,
    /// Staked amount.
    #[serde(with = "crate::amount")]
    pub value: Amount,
}

impl From<&StakeRecord> for AbiStake {
    fn from(record: &StakeRecord) -> Self {
        Self {
            stake_id: record.stake_id,
            forging_keys: record.forging_keys,
            owner: record.owner,
            value: record.value,
        }
    }
}

/// Encodes the stake list as a dynamic array: an offset word, a length word,
/// then [`STAKE_WORDS`] words per stake.
#[must_use]
pub fn encode_stakes<'a, I>(stakes: I) -> Vec<u8>
where
    I: ExactSizeIterator<Item = &'a StakeRecord>,
{
    let count = stakes.len();
    let mut data = Vec::with_capacity((2 + count * STAKE_WORDS) * WORD_SIZE);
    data.extend_from_slice(&amount_to_word(WORD_SIZE as Amount));
    data.extend_from_slice(&amount_to_word(count as Amount));

    for stake in stakes {
        let (vrf_head, vrf_last) = stake.forging_keys.vrf_public_key.split();
        let mut vrf_tail = [0u8; WORD_SIZE];
        vrf_tail[0] = vrf_last;

        data.extend_from_slice(stake.stake_id.as_bytes());
        data.extend_from_slice(
            &stake.forging_keys.block_sign_public_key.to_bytes(),
        );
        data.extend_from_slice(&vrf_head);
        data.extend_from_slice(&vrf_tail);
        data.extend_from_slice(&stake.owner.to_word());
        data.extend_from_slice(&amount_to_word(stake.value));
    }
    data
}

/// Decodes the output of [`encode_stakes`].
///
/// # Errors
/// If the data is not a well formed stake list.
pub fn decode_stakes(data: &[u8]) -> Result<Vec<AbiStake>, Error> {
    let offset = word_to_amount(&read_word(data, 0)?)?;
    if offset != WORD_SIZE as Amount {
        return Err(Error::InvalidWord(0));
    }
    let count = usize::try_from(word_to_amount(&read_word(data, WORD_SIZE)?)?)
        .map_err(|_| Error::InvalidWord(WORD_SIZE))?;
    let len = count
        .checked_mul(STAKE_WORDS)
        .and_then(|words| words.checked_add(2))
        .and_then(|words| words.checked_mul(WORD_SIZE))
        .ok_or(Error::InvalidWord(WORD_SIZE))?;
    expect_len(data, len)?;

    let mut stakes = Vec::with_capacity(count);
    for i in 0..count {
        let base = (2 + i * STAKE_WORDS) * WORD_SIZE;
        let word = |n: usize| read_word(data, base + n * WORD_SIZE);

        let vrf_tail = word(3)?;
        let vrf_public_key = VrfPublicKey::join(&word(2)?, vrf_tail[0])
            .map_err(|_| Error::InvalidWord(base + 2 * WORD_SIZE))?;

        stakes.push(AbiStake {
            stake_id: StakeId::from_array(word(0)?),
            forging_keys: ForgingKeys::new(
                BlockSignPublicKey::from_array(word(1)?),
                vrf_public_key,
            ),
            owner: Address::from_word(&word(4)?)?,
            value: word_to_amount(&word(5)?)?,
        });
    }
    Ok(stakes)
}
