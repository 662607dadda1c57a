// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Account state of the chain.

use std::collections::BTreeMap;

use forger_core::events::Log;
use forger_core::{Address, Amount, Epoch, NATIVE_CONTRACTS};
use forger_stake_contract::{Host, HostError, SnapshotId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Externally owned account, controlled by a key.
    #[default]
    Eoa,
    /// Account holding code, or a native contract.
    Contract,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(with = "forger_core::amount")]
    pub balance: Amount,
    pub nonce: u64,
    pub kind: AccountKind,
}

#[derive(Debug, Clone)]
enum Change {
    Account(Address, Option<Account>),
    Log,
}

/// Balances, nonces and code presence of every account, together with the
/// logs of the transaction being executed.
///
/// Changes are journaled until [`WorldState::commit`] is called, so that
/// they can be reverted to any snapshot taken in the meantime.
#[derive(Debug, Clone)]
pub struct WorldState {
    accounts: BTreeMap<Address, Account>,
    epoch: Epoch,
    logs: Vec<Log>,
    journal: Vec<Change>,
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldState {
    /// Creates a state holding only the native contracts.
    pub fn new() -> Self {
        let accounts = NATIVE_CONTRACTS
            .iter()
            .map(|address| {
                let account = Account {
                    kind: AccountKind::Contract,
                    ..Account::default()
                };
                (*address, account)
            })
            .collect();
        Self {
            accounts,
            epoch: 0,
            logs: Vec::new(),
            journal: Vec::new(),
        }
    }

    pub fn account(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &Account)> {
        self.accounts.iter()
    }

    pub fn nonce(&self, address: &Address) -> u64 {
        self.accounts.get(address).map_or(0, |a| a.nonce)
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn set_epoch(&mut self, epoch: Epoch) {
        self.epoch = epoch;
    }

    pub fn increment_nonce(&mut self, address: &Address) {
        self.update(address, |account| account.nonce += 1);
    }

    /// Marks `address` as holding code.
    pub fn deploy_contract(&mut self, address: &Address) {
        self.update(address, |account| account.kind = AccountKind::Contract);
    }

    /// Credits `amount` to `address` without taking it from anyone.
    pub fn mint(
        &mut self,
        address: &Address,
        amount: Amount,
    ) -> Result<(), HostError> {
        self.credit(address, amount)
    }

    /// Sum of all balances.
    pub fn total_supply(&self) -> Amount {
        self.accounts
            .values()
            .fold(0, |acc, a| acc.saturating_add(a.balance))
    }

    /// Returns and clears the logs emitted since the last call.
    pub fn take_logs(&mut self) -> Vec<Log> {
        std::mem::take(&mut self.logs)
    }

    /// Accepts every change made so far, discarding all snapshots.
    pub fn commit(&mut self) {
        self.journal.clear();
    }

    fn update(&mut self, address: &Address, f: impl FnOnce(&mut Account)) {
        let old = self.accounts.get(address).cloned();
        self.journal.push(Change::Account(*address, old));
        f(self.accounts.entry(*address).or_default());
    }
}

impl Host for WorldState {
    fn balance(&self, account: &Address) -> Amount {
        self.accounts.get(account).map_or(0, |a| a.balance)
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
        self.update(account, |a| a.balance -= amount);
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
        self.update(account, |a| a.balance = balance);
        Ok(())
    }

    fn is_externally_owned(&self, account: &Address) -> bool {
        self.accounts
            .get(account)
            .is_none_or(|a| a.kind == AccountKind::Eoa)
    }

    fn current_epoch(&self) -> Epoch {
        self.epoch
    }

    fn emit_log(&mut self, log: Log) {
        self.logs.push(log);
        self.journal.push(Change::Log);
    }

    fn snapshot(&mut self) -> SnapshotId {
        SnapshotId(self.journal.len())
    }

    fn revert_to_snapshot(&mut self, id: SnapshotId) {
        while self.journal.len() > id.0 {
            match self.journal.pop() {
                Some(Change::Account(address, Some(account))) => {
                    self.accounts.insert(address, account);
                }
                Some(Change::Account(address, None)) => {
                    self.accounts.remove(&address);
                }
                Some(Change::Log) => {
                    self.logs.pop();
                }
                None => break,
            }
        }
    }
}
