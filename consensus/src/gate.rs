// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Forging eligibility per epoch.
//!
//! The set of keys allowed to forge in epoch `N` is computed from the stake
//! list as it was when epoch `N - 2` closed. That list is final before epoch
//! `N` starts, so every node agrees on the forgers of an epoch ahead of
//! time, and a stake change only takes effect two epochs after the block
//! including it.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use forger_core::Epoch;
use forger_core::keys::ForgingKeys;
use forger_core::stake::{ACTIVATION_DELAY, StakeRecord};
use tracing::{debug, info};

use crate::errors::GateError;
use crate::user::provisioners::{ForgingStakeInfo, Provisioners};
use crate::user::stake::StakeStatus;

/// The stake list frozen at the close of an epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSnapshot {
    epoch: Option<Epoch>,
    stakes: Vec<StakeRecord>,
    provisioners: Provisioners,
}

impl LedgerSnapshot {
    fn new(epoch: Option<Epoch>, stakes: Vec<StakeRecord>) -> Self {
        let provisioners = Provisioners::from_stakes(&stakes);
        Self {
            epoch,
            stakes,
            provisioners,
        }
    }

    /// The epoch whose close produced this snapshot, or `None` for the
    /// genesis snapshot.
    pub fn epoch(&self) -> Option<Epoch> {
        self.epoch
    }

    /// The live stakes, in insertion order.
    pub fn stakes(&self) -> &[StakeRecord] {
        &self.stakes
    }

    pub fn provisioners(&self) -> &Provisioners {
        &self.provisioners
    }
}

/// Keeps the snapshots needed to answer eligibility queries.
///
/// Queries never observe a stake list that is still being modified: the
/// snapshot for an epoch is only taken once the epoch is closed.
#[derive(Debug, Clone)]
pub struct EligibilityGate {
    genesis: Arc<LedgerSnapshot>,
    closed: BTreeMap<Epoch, Arc<LedgerSnapshot>>,
    first_closed: Option<Epoch>,
    last_closed: Option<Epoch>,
}

impl EligibilityGate {
    /// Creates a gate whose first epochs use the genesis stakes.
    pub fn new(genesis: Vec<StakeRecord>) -> Self {
        Self {
            genesis: Arc::new(LedgerSnapshot::new(None, genesis)),
            closed: BTreeMap::new(),
            first_closed: None,
            last_closed: None,
        }
    }

    pub fn last_closed(&self) -> Option<Epoch> {
        self.last_closed
    }

    /// Records the stake list at the close of `epoch`.
    ///
    /// Epochs must be closed in increasing order. An epoch that is skipped
    /// is considered to have the stake list of the last epoch closed before
    /// it.
    pub fn close_epoch(
        &mut self,
        epoch: Epoch,
        stakes: Vec<StakeRecord>,
    ) -> Result<(), GateError> {
        if let Some(last_closed) = self.last_closed {
            if epoch <= last_closed {
                return Err(GateError::EpochOutOfOrder { epoch, last_closed });
            }
        }
        info!(event = "epoch closed", epoch, stakes = stakes.len());
        self.closed
            .insert(epoch, Arc::new(LedgerSnapshot::new(Some(epoch), stakes)));
        self.first_closed.get_or_insert(epoch);
        self.last_closed = Some(epoch);
        Ok(())
    }

    /// The snapshot eligibility in `epoch` is computed from.
    pub fn snapshot_for(
        &self,
        epoch: Epoch,
    ) -> Result<Arc<LedgerSnapshot>, GateError> {
        let Some(target) = epoch.checked_sub(ACTIVATION_DELAY) else {
            return Ok(self.genesis.clone());
        };
        match self.last_closed {
            Some(last_closed) if last_closed >= target => {}
            _ => return Err(GateError::EpochNotFinal(target)),
        }
        let snapshot = match self.closed.range(..=target).next_back() {
            Some((_, snapshot)) => snapshot.clone(),
            // closed at or before target, then dropped by `prune`
            None if self.first_closed.is_some_and(|first| first <= target) => {
                return Err(GateError::EpochPruned(target));
            }
            None => self.genesis.clone(),
        };
        debug!(
            event = "eligibility snapshot",
            epoch,
            snapshot_epoch = ?snapshot.epoch(),
        );
        Ok(snapshot)
    }

    /// The forging keys allowed to forge in `epoch`.
    pub fn eligible_forgers(
        &self,
        epoch: Epoch,
    ) -> Result<BTreeSet<ForgingKeys>, GateError> {
        let snapshot = self.snapshot_for(epoch)?;
        Ok(snapshot.provisioners().keys().copied().collect())
    }

    /// The forging keys allowed to forge in `epoch` with their stake.
    pub fn provisioners(
        &self,
        epoch: Epoch,
    ) -> Result<Provisioners, GateError> {
        Ok(self.snapshot_for(epoch)?.provisioners().clone())
    }

    /// The forging keys allowed to forge in `epoch`, by descending stake.
    pub fn forging_stake_info(
        &self,
        epoch: Epoch,
    ) -> Result<Vec<ForgingStakeInfo>, GateError> {
        Ok(self.snapshot_for(epoch)?.provisioners().forging_stake_info())
    }

    /// Whether `keys` may forge a block in `epoch`.
    pub fn is_eligible(
        &self,
        keys: &ForgingKeys,
        epoch: Epoch,
    ) -> Result<bool, GateError> {
        Ok(self.snapshot_for(epoch)?.provisioners().contains(keys))
    }

    /// Status of a stake in `epoch`, as seen by the forging eligibility.
    pub fn status(
        &self,
        record: &StakeRecord,
        epoch: Epoch,
    ) -> Result<StakeStatus, GateError> {
        let snapshot = self.snapshot_for(epoch)?;
        let counted = snapshot
            .stakes()
            .iter()
            .any(|stake| stake.stake_id == record.stake_id);
        Ok(if counted {
            StakeStatus::Active
        } else if epoch < record.activation_epoch() {
            StakeStatus::Pending
        } else {
            StakeStatus::Retired
        })
    }

    /// Drops the snapshots no query for `epoch` or later can use. Queries
    /// for earlier epochs fail with [`GateError::EpochPruned`] afterwards.
    pub fn prune(&mut self, epoch: Epoch) {
        let Some(target) = epoch.checked_sub(ACTIVATION_DELAY) else {
            return;
        };
        let keep = self.closed.range(..=target).next_back().map(|(e, _)| *e);
        if let Some(keep) = keep {
            self.closed = self.closed.split_off(&keep);
        }
    }
}
