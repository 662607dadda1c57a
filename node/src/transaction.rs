// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use forger_core::events::Log;
use forger_core::{Address, Amount, Epoch, keccak256};
use serde::{Deserialize, Serialize};

/// Hash identifying a transaction.
pub type TxHash = [u8; 32];

/// A value transfer, possibly carrying a call to a contract.
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub from: Address,
    pub to: Address,
    pub nonce: u64,
    #[serde(with = "forger_core::amount")]
    pub value: Amount,
    pub gas_limit: u64,
    #[serde(with = "forger_core::amount")]
    pub gas_price: Amount,
    #[serde_as(as = "serde_with::hex::Hex")]
    #[serde(default)]
    pub data: Vec<u8>,
}

impl Transaction {
    /// Hash of the transaction's fields.
    pub fn hash(&self) -> TxHash {
        let mut bytes = Vec::with_capacity(
            2 * Address::SIZE + 8 + 16 + 8 + 16 + self.data.len(),
        );
        bytes.extend_from_slice(self.from.as_bytes());
        bytes.extend_from_slice(self.to.as_bytes());
        bytes.extend_from_slice(&self.nonce.to_be_bytes());
        bytes.extend_from_slice(&self.value.to_be_bytes());
        bytes.extend_from_slice(&self.gas_limit.to_be_bytes());
        bytes.extend_from_slice(&self.gas_price.to_be_bytes());
        bytes.extend_from_slice(&self.data);
        keccak256(&bytes)
    }

    /// The most the sender may pay in fees.
    pub fn max_fee(&self) -> Option<Amount> {
        Amount::from(self.gas_limit).checked_mul(self.gas_price)
    }
}

/// Outcome of an included transaction.
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    #[serde_as(as = "serde_with::hex::Hex")]
    pub tx_hash: TxHash,
    pub block_height: u64,
    pub epoch: Epoch,
    /// `true` if the transaction succeeded, `false` if it reverted.
    pub status: bool,
    pub gas_used: u64,
    pub logs: Vec<Log>,
    #[serde_as(as = "serde_with::hex::Hex")]
    pub output: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub revert_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx() -> Transaction {
        Transaction {
            from: Address::from_array([1; 20]),
            to: Address::from_array([2; 20]),
            nonce: 0,
            value: 10,
            gas_limit: 21_000,
            gas_price: 1,
            data: vec![],
        }
    }

    #[test]
    fn hash_covers_every_field() {
        let base = tx();
        let mut other = tx();
        other.nonce = 1;
        assert_ne!(base.hash(), other.hash());
        let mut other = tx();
        other.data = vec![0];
        assert_ne!(base.hash(), other.hash());
        assert_eq!(base.hash(), tx().hash());
    }

    #[test]
    fn json_shape() {
        let json = serde_json::to_value(tx()).expect("serialize");
        assert_eq!(json["value"], "10");
        assert_eq!(json["gasLimit"], 21_000);
        assert_eq!(json["data"], "");
        let back: Transaction =
            serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, tx());
    }
}
