// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::collections::{BTreeMap, BTreeSet};

use forger_core::events::Log;
use forger_core::{Address, Amount, Epoch, FORGER_STAKE_CONTRACT};
use forger_stake_contract::{Host, HostError, SnapshotId};

/// In-memory host keeping balances and logs, snapshotted by cloning.
#[derive(Debug, Clone, Default)]
pub struct TestHost {
    balances: BTreeMap<Address, Amount>,
    contracts: BTreeSet<Address>,
    epoch: Epoch,
    logs: Vec<Log>,
    snapshots: Vec<(BTreeMap<Address, Amount>, usize)>,
}

impl TestHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fund(&mut self, account: Address, amount: Amount) {
        *self.balances.entry(account).or_default() += amount;
    }

    pub fn deploy(&mut self, account: Address) {
        self.contracts.insert(account);
    }

    pub fn set_epoch(&mut self, epoch: Epoch) {
        self.epoch = epoch;
    }

    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    /// Returns the logs emitted so far, clearing them.
    pub fn take_logs(&mut self) -> Vec<Log> {
        std::mem::take(&mut self.logs)
    }

    pub fn registry_balance(&self) -> Amount {
        self.balance(&FORGER_STAKE_CONTRACT)
    }
}

impl Host for TestHost {
    fn balance(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or_default()
    }

    fn debit(
        &mut self,
        account: &Address,
        amount: Amount,
    ) -> Result<(), HostError> {
        let balance = self.balance(account);
        if balance < amount {
            return Err(HostError::InsufficientBalance {
                account: *account,
                balance,
                required: amount,
            });
        }
        self.balances.insert(*account, balance - amount);
        Ok(())
    }

    fn credit(
        &mut self,
        account: &Address,
        amount: Amount,
    ) -> Result<(), HostError> {
        let balance = self
            .balance(account)
            .checked_add(amount)
            .ok_or(HostError::Overflow(*account))?;
        self.balances.insert(*account, balance);
        Ok(())
    }

    fn is_externally_owned(&self, account: &Address) -> bool {
        !self.contracts.contains(account)
    }

    fn current_epoch(&self) -> Epoch {
        self.epoch
    }

    fn emit_log(&mut self, log: Log) {
        self.logs.push(log);
    }

    fn snapshot(&mut self) -> SnapshotId {
        self.snapshots.push((self.balances.clone(), self.logs.len()));
        SnapshotId(self.snapshots.len() - 1)
    }

    fn revert_to_snapshot(&mut self, id: SnapshotId) {
        if id.0 < self.snapshots.len() {
            let (balances, logs) = self.snapshots[id.0].clone();
            self.snapshots.truncate(id.0);
            self.balances = balances;
            self.logs.truncate(logs);
        }
    }
}
