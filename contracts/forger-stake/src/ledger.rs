// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::collections::HashMap;

use forger_core::keys::ForgingKeys;
use forger_core::stake::{StakeId, StakeRecord};
use forger_core::{Address, Amount, Epoch};

use crate::error::{Abort, Error};
use crate::gas::GasMeter;

/// Number of storage cells a stake record occupies.
pub const RECORD_CELLS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    record: StakeRecord,
    prev: Option<StakeId>,
    next: Option<StakeId>,
}

#[derive(Debug, Clone)]
enum Change {
    Node(StakeId, Option<Node>),
    Head(Option<StakeId>),
    Tail(Option<StakeId>),
    Sequence(u64),
    Total(Amount),
}

/// Position in the ledger's journal that can be rolled back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Insertion-ordered collection of stake records.
///
/// Records are kept in a doubly linked list threaded through an id-indexed
/// map, so that inserting at the tail and removing any record touch a fixed
/// number of cells regardless of how many records are live.
///
/// Every mutation is journaled, and can be undone with
/// [`StakeLedger::rollback`].
#[derive(Debug, Clone, Default)]
pub struct StakeLedger {
    nodes: HashMap<StakeId, Node>,
    head: Option<StakeId>,
    tail: Option<StakeId>,
    sequence: u64,
    total: Amount,
    journal: Vec<Change>,
}

impl StakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Sum of the value of all live records.
    pub fn total(&self) -> Amount {
        self.total
    }

    /// Number of records ever inserted. Never decreases outside of a
    /// rollback.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn contains(&self, stake_id: &StakeId) -> bool {
        self.nodes.contains_key(stake_id)
    }

    /// Returns a record without charging gas.
    pub fn peek(&self, stake_id: &StakeId) -> Option<&StakeRecord> {
        self.nodes.get(stake_id).map(|node| &node.record)
    }

    /// Iterates over the live records in insertion order without charging
    /// gas.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            ledger: self,
            cursor: self.head,
        }
    }

    /// Appends a new record, returning its identifier.
    ///
    /// The identifier is derived from `origin` and the ledger's insertion
    /// sequence number.
    pub fn insert(
        &mut self,
        origin: &[u8; 32],
        owner: Address,
        forging_keys: ForgingKeys,
        value: Amount,
        created_epoch: Epoch,
        gas: &mut GasMeter,
    ) -> Result<StakeId, Abort> {
        gas.charge_read(1)?;
        let sequence = self.sequence;
        let stake_id = StakeId::derive(origin, sequence);
        if self.nodes.contains_key(&stake_id) {
            return Err(Error::DuplicateStake(stake_id).into());
        }
        let total = self.total.checked_add(value).ok_or(Error::Overflow)?;

        gas.charge_write(1, sequence == 0, false)?;
        self.set_sequence(sequence + 1);

        gas.charge_read(1)?;
        let prev = self.tail;
        match prev {
            Some(tail) => {
                gas.charge_write(1, true, false)?;
                self.update_node(tail, |node| node.next = Some(stake_id));
            }
            None => {
                gas.charge_write(1, true, false)?;
                self.set_head(Some(stake_id));
            }
        }

        gas.charge_write(RECORD_CELLS, true, false)?;
        if prev.is_some() {
            gas.charge_write(1, true, false)?;
        }
        let record = StakeRecord::new(
            stake_id,
            owner,
            forging_keys,
            value,
            created_epoch,
        );
        self.set_node(
            stake_id,
            Some(Node {
                record,
                prev,
                next: None,
            }),
        );

        gas.charge_write(1, prev.is_none(), false)?;
        self.set_tail(Some(stake_id));

        self.charge_total(gas, total)?;
        self.set_total(total);

        Ok(stake_id)
    }

    /// Reads a record.
    pub fn get(
        &self,
        stake_id: &StakeId,
        gas: &mut GasMeter,
    ) -> Result<Option<StakeRecord>, Abort> {
        gas.charge_read(RECORD_CELLS)?;
        Ok(self.peek(stake_id).cloned())
    }

    /// Removes a record, returning it if it was live.
    pub fn remove(
        &mut self,
        stake_id: &StakeId,
        gas: &mut GasMeter,
    ) -> Result<Option<StakeRecord>, Abort> {
        gas.charge_read(1)?;
        let Some(node) = self.nodes.get(stake_id).cloned() else {
            return Ok(None);
        };
        let total = self
            .total
            .checked_sub(node.record.value)
            .ok_or(Error::Overflow)?;

        gas.charge_read(2)?;
        match node.prev {
            Some(prev) => {
                gas.charge_write(1, false, node.next.is_none())?;
                self.update_node(prev, |n| n.next = node.next);
            }
            None => {
                gas.charge_write(1, false, node.next.is_none())?;
                self.set_head(node.next);
            }
        }
        match node.next {
            Some(next) => {
                gas.charge_write(1, false, node.prev.is_none())?;
                self.update_node(next, |n| n.prev = node.prev);
            }
            None => {
                gas.charge_write(1, false, node.prev.is_none())?;
                self.set_tail(node.prev);
            }
        }

        let links =
            u64::from(node.prev.is_some()) + u64::from(node.next.is_some());
        gas.charge_write(RECORD_CELLS + links, false, true)?;
        self.set_node(*stake_id, None);

        self.charge_total(gas, total)?;
        self.set_total(total);

        Ok(Some(node.record))
    }

    /// Reads all the records in insertion order.
    pub fn list(&self, gas: &mut GasMeter) -> Result<Vec<StakeRecord>, Abort> {
        gas.charge_read(1)?;
        let mut records = Vec::with_capacity(self.len());
        for record in self.iter() {
            gas.charge_read(RECORD_CELLS + 1)?;
            records.push(record.clone());
        }
        Ok(records)
    }

    /// Marks the current state, so it can be restored by
    /// [`StakeLedger::rollback`].
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.journal.len())
    }

    /// Undoes every change made since `checkpoint`.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        while self.journal.len() > checkpoint.0 {
            let Some(change) = self.journal.pop() else {
                break;
            };
            match change {
                Change::Node(id, Some(node)) => {
                    self.nodes.insert(id, node);
                }
                Change::Node(id, None) => {
                    self.nodes.remove(&id);
                }
                Change::Head(head) => self.head = head,
                Change::Tail(tail) => self.tail = tail,
                Change::Sequence(sequence) => self.sequence = sequence,
                Change::Total(total) => self.total = total,
            }
        }
    }

    /// Accepts the changes made since `checkpoint`. Committing the outermost
    /// checkpoint discards the journal.
    pub fn commit(&mut self, checkpoint: Checkpoint) {
        if checkpoint.0 == 0 {
            self.journal.clear();
        }
    }

    fn charge_total(
        &self,
        gas: &mut GasMeter,
        total: Amount,
    ) -> Result<(), Abort> {
        gas.charge_read(1)?;
        gas.charge_write(1, self.total == 0, total == 0)?;
        Ok(())
    }

    fn set_node(&mut self, id: StakeId, node: Option<Node>) {
        let old = match node {
            Some(node) => self.nodes.insert(id, node),
            None => self.nodes.remove(&id),
        };
        self.journal.push(Change::Node(id, old));
    }

    fn update_node(&mut self, id: StakeId, f: impl FnOnce(&mut Node)) {
        if let Some(node) = self.nodes.get_mut(&id) {
            self.journal.push(Change::Node(id, Some(node.clone())));
            f(node);
        }
    }

    fn set_head(&mut self, head: Option<StakeId>) {
        let old = std::mem::replace(&mut self.head, head);
        self.journal.push(Change::Head(old));
    }

    fn set_tail(&mut self, tail: Option<StakeId>) {
        let old = std::mem::replace(&mut self.tail, tail);
        self.journal.push(Change::Tail(old));
    }

    fn set_sequence(&mut self, sequence: u64) {
        let old = std::mem::replace(&mut self.sequence, sequence);
        self.journal.push(Change::Sequence(old));
    }

    fn set_total(&mut self, total: Amount) {
        let old = std::mem::replace(&mut self.total, total);
        self.journal.push(Change::Total(old));
    }
}

/// Iterator over the records of a [`StakeLedger`], in insertion order.
pub struct Iter<'a> {
    ledger: &'a StakeLedger,
    cursor: Option<StakeId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a StakeRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.ledger.nodes.get(&self.cursor?)?;
        self.cursor = node.next;
        Some(&node.record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forger_core::keys::{BlockSignPublicKey, VrfPublicKey};

    fn keys(seed: u8) -> ForgingKeys {
        let mut vrf = [seed; 33];
        vrf[0] = 0x03;
        ForgingKeys::new(
            BlockSignPublicKey::from_array([seed; 32]),
            VrfPublicKey::join(&vrf[..32].try_into().expect("32 bytes"), seed)
                .expect("valid key"),
        )
    }

    fn insert(ledger: &mut StakeLedger, seed: u8, value: Amount) -> StakeId {
        ledger
            .insert(
                &[seed; 32],
                Address::from_array([seed; 20]),
                keys(seed),
                value,
                0,
                &mut GasMeter::unmetered(),
            )
            .expect("insert should succeed")
    }

    fn remove(ledger: &mut StakeLedger, id: &StakeId) -> Option<StakeRecord> {
        ledger
            .remove(id, &mut GasMeter::unmetered())
            .expect("remove should succeed")
    }

    fn values(ledger: &StakeLedger) -> Vec<Amount> {
        ledger.iter().map(|r| r.value).collect()
    }

    #[test]
    fn keeps_insertion_order() {
        let mut ledger = StakeLedger::new();
        let ids: Vec<_> =
            (1..=5).map(|i| insert(&mut ledger, i, i.into())).collect();
        assert_eq!(values(&ledger), vec![1, 2, 3, 4, 5]);
        assert_eq!(ledger.total(), 15);

        remove(&mut ledger, &ids[2]).expect("live record");
        remove(&mut ledger, &ids[0]).expect("live record");
        remove(&mut ledger, &ids[4]).expect("live record");
        assert_eq!(values(&ledger), vec![2, 4]);
        assert_eq!(ledger.total(), 6);

        insert(&mut ledger, 6, 6);
        assert_eq!(values(&ledger), vec![2, 4, 6]);
        assert_eq!(ledger.sequence(), 6);
    }

    #[test]
    fn remove_unknown_is_none() {
        let mut ledger = StakeLedger::new();
        let id = insert(&mut ledger, 1, 10);
        assert!(remove(&mut ledger, &id).is_some());
        assert!(remove(&mut ledger, &id).is_none());
        assert!(ledger.is_empty());
        assert_eq!(ledger.total(), 0);
    }

    #[test]
    fn rollback_restores_everything() {
        let mut ledger = StakeLedger::new();
        let first = insert(&mut ledger, 1, 10);
        let second = insert(&mut ledger, 2, 20);
        ledger.commit(Checkpoint(0));

        let before = ledger.clone();
        let checkpoint = ledger.checkpoint();
        remove(&mut ledger, &first);
        insert(&mut ledger, 3, 30);
        remove(&mut ledger, &second);
        ledger.rollback(checkpoint);

        assert_eq!(ledger.nodes, before.nodes);
        assert_eq!(ledger.head, before.head);
        assert_eq!(ledger.tail, before.tail);
        assert_eq!(ledger.sequence(), 2);
        assert_eq!(ledger.total(), 30);
    }

    #[test]
    fn insert_cost_is_stable() {
        let mut ledger = StakeLedger::new();
        let mut costs = Vec::new();
        for i in 0..50u8 {
            let mut gas = GasMeter::unmetered();
            ledger
                .insert(&[i; 32], Address::default(), keys(1), 1, 0, &mut gas)
                .expect("insert should succeed");
            costs.push(gas.spent());
        }
        assert_ne!(costs[0], costs[1]);
        assert!(costs[1..].iter().all(|c| *c == costs[1]));
    }
}
