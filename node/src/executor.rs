// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Transaction execution.
//!
//! A transaction goes through the following steps:
//!
//! 1. Admission: the nonce must be the sender's next one, the gas limit must
//!    cover the intrinsic cost, and the sender must be able to pay the whole
//!    gas limit. A transaction failing admission is rejected and leaves no
//!    trace.
//!
//! 2. The fee for the whole gas limit is taken from the sender, and the nonce
//!    is incremented. Neither is undone by a revert.
//!
//! 3. The call is executed. Calls to the forger stake registry are dispatched
//!    to it, anything else is a plain value transfer.
//!
//! 4. The unspent gas is refunded. A reverted call spends its whole gas
//!    limit, so nothing is refunded.

use forger_core::{Address, Amount, FORGER_STAKE_CONTRACT};
use forger_stake_contract::{
    CallReceipt, ForgerStakeContract, Host, HostError, Message, Revert,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::state::WorldState;
use crate::transaction::{Receipt, Transaction};

/// Parameters of transaction execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Gas charged to every transaction before execution.
    pub intrinsic_gas: u64,
    /// Gas charged for each byte of call data.
    pub gas_per_data_byte: u64,
    /// Lowest gas price accepted.
    #[serde(with = "forger_core::amount")]
    pub min_gas_price: Amount,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            intrinsic_gas: 21_000,
            gas_per_data_byte: 16,
            min_gas_price: 1,
        }
    }
}

impl ExecutionConfig {
    /// Gas spent by `tx` before any call is executed.
    pub fn intrinsic_gas(&self, tx: &Transaction) -> u64 {
        let data = self
            .gas_per_data_byte
            .saturating_mul(tx.data.len() as u64);
        self.intrinsic_gas.saturating_add(data)
    }
}

/// Reasons for a transaction not to be admitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectError {
    #[error("invalid nonce for {sender}: expected {expected}, found {found}")]
    InvalidNonce {
        sender: Address,
        expected: u64,
        found: u64,
    },
    #[error("gas limit {limit} below intrinsic gas {required}")]
    IntrinsicGas { limit: u64, required: u64 },
    #[error("gas price {price} below minimum {min}")]
    GasPriceTooLow { price: Amount, min: Amount },
    #[error("{sender} cannot pay a fee of {fee}, holding {balance}")]
    InsufficientFunds {
        sender: Address,
        fee: Amount,
        balance: Amount,
    },
    #[error("fee overflows")]
    FeeOverflow,
    #[error("transaction already known")]
    AlreadyKnown,
    #[error("mempool is full")]
    MempoolFull,
}

/// Failure of the execution of an admitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("transaction rejected: {0}")]
    Rejected(#[from] RejectError),
    #[error("registry failure: {0}")]
    Registry(#[from] forger_stake_contract::Error),
    #[error("balance failure: {0}")]
    Host(#[from] HostError),
}

/// Checks whether `tx` can be executed on top of `state`, assuming the
/// sender's next nonce is `expected_nonce`.
pub fn check(
    state: &WorldState,
    tx: &Transaction,
    expected_nonce: u64,
    config: &ExecutionConfig,
) -> Result<(), RejectError> {
    if tx.nonce != expected_nonce {
        return Err(RejectError::InvalidNonce {
            sender: tx.from,
            expected: expected_nonce,
            found: tx.nonce,
        });
    }
    let required = config.intrinsic_gas(tx);
    if tx.gas_limit < required {
        return Err(RejectError::IntrinsicGas {
            limit: tx.gas_limit,
            required,
        });
    }
    if tx.gas_price < config.min_gas_price {
        return Err(RejectError::GasPriceTooLow {
            price: tx.gas_price,
            min: config.min_gas_price,
        });
    }
    let fee = tx.max_fee().ok_or(RejectError::FeeOverflow)?;
    let balance = state.balance(&tx.from);
    if balance < fee {
        return Err(RejectError::InsufficientFunds {
            sender: tx.from,
            fee,
            balance,
        });
    }
    Ok(())
}

/// Executes a transaction, committing its effects to `state` and `registry`.
///
/// The returned receipt lacks the block height, which is filled in by the
/// caller.
pub fn execute(
    state: &mut WorldState,
    registry: &mut ForgerStakeContract,
    tx: &Transaction,
    config: &ExecutionConfig,
) -> Result<Receipt, ExecutionError> {
    check(state, tx, state.nonce(&tx.from), config)?;
    let tx_hash = tx.hash();

    let fee = tx.max_fee().ok_or(RejectError::FeeOverflow)?;
    state.debit(&tx.from, fee)?;
    state.increment_nonce(&tx.from);
    state.commit();

    let intrinsic = config.intrinsic_gas(tx);
    let call_gas = tx.gas_limit - intrinsic;

    let call = if tx.to == FORGER_STAKE_CONTRACT {
        let msg = Message {
            caller: tx.from,
            value: tx.value,
            data: tx.data.clone(),
            gas_limit: call_gas,
            origin: tx_hash,
        };
        registry.execute(state, &msg)?
    } else {
        transfer(state, tx, call_gas)
    };

    let gas_used = intrinsic + call.gas_spent;
    let refund = Amount::from(tx.gas_limit - gas_used) * tx.gas_price;
    state.credit(&tx.from, refund)?;
    let logs = state.take_logs();
    state.commit();

    let (status, output, revert_reason) = match call.data {
        Ok(output) => (true, output, None),
        Err(revert) => {
            debug!(
                event = "transaction reverted",
                tx = hex::encode(tx_hash),
                %revert,
            );
            (false, Vec::new(), Some(revert.to_string()))
        }
    };

    Ok(Receipt {
        tx_hash,
        block_height: 0,
        epoch: state.epoch(),
        status,
        gas_used,
        logs,
        output,
        revert_reason,
    })
}

/// Moves the value of `tx` to its recipient. Only externally owned accounts
/// can receive plain transfers.
fn transfer(
    state: &mut WorldState,
    tx: &Transaction,
    gas_limit: u64,
) -> CallReceipt {
    let reverted = |revert| CallReceipt {
        gas_spent: gas_limit,
        gas_limit,
        data: Err(revert),
    };

    if !state.is_externally_owned(&tx.to) {
        warn!(event = "call to unsupported contract", to = %tx.to);
        return reverted(Revert::NonPayable);
    }
    let snapshot = state.snapshot();
    if let Err(err) = state
        .debit(&tx.from, tx.value)
        .and_then(|_| state.credit(&tx.to, tx.value))
    {
        state.revert_to_snapshot(snapshot);
        return match err {
            HostError::InsufficientBalance {
                balance, required, ..
            } => reverted(Revert::InsufficientBalance { balance, required }),
            HostError::Overflow(_) => reverted(Revert::InvalidCall(
                forger_core::Error::InvalidData,
            )),
        };
    }
    CallReceipt {
        gas_spent: 0,
        gas_limit,
        data: Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use forger_core::zen;

    fn alice() -> Address {
        Address::from_array([1; 20])
    }

    fn bob() -> Address {
        Address::from_array([2; 20])
    }

    fn transfer_tx(nonce: u64, value: Amount) -> Transaction {
        Transaction {
            from: alice(),
            to: bob(),
            nonce,
            value,
            gas_limit: 21_000,
            gas_price: 1_000,
            data: vec![],
        }
    }

    fn funded_state() -> WorldState {
        let mut state = WorldState::new();
        state.mint(&alice(), zen(1)).expect("mint");
        state.commit();
        state
    }

    #[test]
    fn plain_transfer() {
        let mut state = funded_state();
        let mut registry = ForgerStakeContract::default();
        let config = ExecutionConfig::default();

        let tx = transfer_tx(0, 500);
        let receipt = execute(&mut state, &mut registry, &tx, &config)
            .expect("transaction should execute");
        assert!(receipt.status);
        assert_eq!(receipt.gas_used, 21_000);
        assert_eq!(state.balance(&bob()), 500);
        assert_eq!(state.balance(&alice()), zen(1) - 500 - 21_000 * 1_000);
        assert_eq!(state.nonce(&alice()), 1);
    }

    #[test]
    fn admission_checks() {
        let mut state = funded_state();
        let mut registry = ForgerStakeContract::default();
        let config = ExecutionConfig::default();

        let tx = transfer_tx(1, 1);
        let err = execute(&mut state, &mut registry, &tx, &config)
            .expect_err("nonce is wrong");
        assert_matches!(
            err,
            ExecutionError::Rejected(RejectError::InvalidNonce {
                expected: 0,
                found: 1,
                ..
            })
        );

        let mut tx = transfer_tx(0, 1);
        tx.gas_limit = 20_999;
        assert_matches!(
            check(&state, &tx, 0, &config),
            Err(RejectError::IntrinsicGas { required: 21_000, .. })
        );

        let mut tx = transfer_tx(0, 1);
        tx.gas_price = zen(1);
        assert_matches!(
            check(&state, &tx, 0, &config),
            Err(RejectError::InsufficientFunds { .. })
        );
        assert_eq!(state.balance(&alice()), zen(1));
        assert_eq!(state.nonce(&alice()), 0);
    }

    #[test]
    fn reverted_transfer_pays_full_gas() {
        let mut state = funded_state();
        let mut registry = ForgerStakeContract::default();
        let config = ExecutionConfig::default();

        let mut tx = transfer_tx(0, zen(2));
        tx.gas_limit = 30_000;
        let receipt = execute(&mut state, &mut registry, &tx, &config)
            .expect("transaction should execute");
        assert!(!receipt.status);
        assert_eq!(receipt.gas_used, 30_000);
        assert_eq!(state.balance(&alice()), zen(1) - 30_000 * 1_000);
        assert_eq!(state.balance(&bob()), 0);
        assert_eq!(state.nonce(&alice()), 1);
    }
}
