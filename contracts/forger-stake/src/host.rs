// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use forger_core::events::Log;
use forger_core::{Address, Amount, Epoch};
use thiserror::Error;

/// Identifier of a host state snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SnapshotId(pub usize);

/// Failure of a balance operation requested to the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("{account} holds {balance}, {required} required")]
    InsufficientBalance {
        account: Address,
        balance: Amount,
        required: Amount,
    },
    #[error("balance of {0} overflows")]
    Overflow(Address),
}

/// The ledger and execution environment the registry runs in.
///
/// Every state change performed through the host after a call to
/// [`Host::snapshot`] must be undone by [`Host::revert_to_snapshot`],
/// including emitted logs.
pub trait Host {
    /// Spendable balance of `account`.
    fn balance(&self, account: &Address) -> Amount;

    /// Removes `amount` from the balance of `account`.
    fn debit(&mut self, account: &Address, amount: Amount)
    -> Result<(), HostError>;

    /// Adds `amount` to the balance of `account`.
    fn credit(
        &mut self,
        account: &Address,
        amount: Amount,
    ) -> Result<(), HostError>;

    /// Returns `false` if `account` holds code, or is a native contract.
    fn is_externally_owned(&self, account: &Address) -> bool;

    /// Consensus epoch of the block being executed.
    fn current_epoch(&self) -> Epoch;

    /// Appends a log to the current transaction.
    fn emit_log(&mut self, log: Log);

    /// Takes a snapshot of the host state.
    fn snapshot(&mut self) -> SnapshotId;

    /// Reverts every change made since `id` was taken.
    fn revert_to_snapshot(&mut self, id: SnapshotId);
}
