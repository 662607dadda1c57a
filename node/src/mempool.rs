// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

pub mod conf;

use std::collections::{HashMap, VecDeque};

use forger_core::Address;
use tracing::{debug, warn};

use crate::executor::{self, ExecutionConfig, RejectError};
use crate::state::WorldState;
use crate::transaction::{Transaction, TxHash};

/// Transactions accepted but not yet included in a block, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct Mempool {
    params: conf::Params,
    txs: HashMap<TxHash, Transaction>,
    order: VecDeque<TxHash>,
    /// Next nonce and number of pending transactions of each sender.
    pending: HashMap<Address, (u64, usize)>,
}

impl Mempool {
    pub fn new(params: conf::Params) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, hash: &TxHash) -> bool {
        self.txs.contains_key(hash)
    }

    /// The nonce the next transaction of `sender` must carry.
    pub fn next_nonce(&self, state: &WorldState, sender: &Address) -> u64 {
        self.pending
            .get(sender)
            .map_or_else(|| state.nonce(sender), |(nonce, _)| *nonce)
    }

    /// Accepts a transaction that passes the admission checks against
    /// `state`, taking into account the sender's pending transactions.
    pub fn accept_tx(
        &mut self,
        state: &WorldState,
        tx: Transaction,
        config: &ExecutionConfig,
    ) -> Result<TxHash, RejectError> {
        let hash = tx.hash();
        if self.txs.contains_key(&hash) {
            return Err(RejectError::AlreadyKnown);
        }
        if self.txs.len() >= self.params.max_mempool_txn_count {
            warn!(event = "mempool full", len = self.txs.len());
            return Err(RejectError::MempoolFull);
        }
        let nonce = self.next_nonce(state, &tx.from);
        executor::check(state, &tx, nonce, config)?;

        let entry = self.pending.entry(tx.from).or_insert((nonce, 0));
        entry.0 += 1;
        entry.1 += 1;

        debug!(
            event = "tx accepted",
            hash = hex::encode(hash),
            from = %tx.from,
            nonce = tx.nonce,
        );
        self.txs.insert(hash, tx);
        self.order.push_back(hash);
        Ok(hash)
    }

    /// Removes and returns the oldest transactions, up to the block limit.
    pub fn take_block_txs(&mut self) -> Vec<Transaction> {
        let count = self.order.len().min(self.params.max_block_txn_count);
        let mut txs = Vec::with_capacity(count);
        for hash in self.order.drain(..count) {
            let Some(tx) = self.txs.remove(&hash) else {
                continue;
            };
            if let Some((_, left)) = self.pending.get_mut(&tx.from) {
                *left -= 1;
                if *left == 0 {
                    self.pending.remove(&tx.from);
                }
            }
            txs.push(tx);
        }
        txs
    }
}
